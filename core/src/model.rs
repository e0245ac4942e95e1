//! Domain types for todo lists and their items.
//!
//! A `TodoList` owns its items. Item IDs are unique within a list only; two
//! lists can both have an item with ID 1.

use crate::error::TodoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a todo list, allocated from the `todolist:next_id` counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(u64);

impl ListId {
    /// Wrap a raw list ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an item, unique within its owning list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Wrap a raw item ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized form used for name and title uniqueness.
#[must_use]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Reject values that are empty after trimming.
///
/// # Errors
///
/// Returns `TodoError::Invalid` naming `field`.
pub fn require_text(field: &'static str, value: &str) -> Result<(), TodoError> {
    if value.trim().is_empty() {
        return Err(TodoError::Invalid { field });
    }
    Ok(())
}

/// A single todo item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Identifier within the owning list
    pub id: ItemId,
    /// Title, unique (case-insensitive) within the list
    pub title: String,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
}

/// A todo list aggregate with its embedded items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Identifier
    pub id: ListId,
    /// Name, unique (case-insensitive) across all lists
    pub name: String,
    /// Items in insertion order
    #[serde(default)]
    pub items: Vec<TodoItem>,
}

impl TodoList {
    /// Create a list with no items.
    #[must_use]
    pub fn new(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Find an item by ID.
    #[must_use]
    pub fn find_item(&self, item_id: ItemId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Position of an item in the collection.
    #[must_use]
    pub fn position_of(&self, item_id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }

    /// Whether another item already uses `title` (trimmed, case-insensitive).
    ///
    /// `exclude` skips one item, so an item never collides with itself.
    #[must_use]
    pub fn title_taken(&self, title: &str, exclude: Option<ItemId>) -> bool {
        let wanted = normalize(title);
        self.items
            .iter()
            .filter(|item| Some(item.id) != exclude)
            .any(|item| normalize(&item.title) == wanted)
    }

    /// Mark every incomplete item as completed. Returns how many changed.
    pub fn complete_all_items(&mut self) -> usize {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|item| !item.completed) {
            item.completed = true;
            changed += 1;
        }
        changed
    }

    /// Remove an item by ID, returning it.
    pub fn remove_item(&mut self, item_id: ItemId) -> Option<TodoItem> {
        let index = self.position_of(item_id)?;
        Some(self.items.remove(index))
    }
}

/// Input for creating a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodoList {
    /// List name
    pub name: String,
}

impl NewTodoList {
    /// Build a create request.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Input for renaming a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPatch {
    /// New list name
    pub name: String,
}

impl ListPatch {
    /// Build a rename request.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Input for creating an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodoItem {
    /// Item title
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Initial completion flag
    #[serde(default)]
    pub completed: bool,
}

impl NewTodoItem {
    /// An incomplete item with no description.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the initial completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Partial update of an item. `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New completion flag
    #[serde(default)]
    pub completed: Option<bool>,
}

impl ItemPatch {
    /// Apply the patch on top of `item`, keeping its ID.
    #[must_use]
    pub fn apply_to(&self, item: &TodoItem) -> TodoItem {
        TodoItem {
            id: item.id,
            title: self.title.clone().unwrap_or_else(|| item.title.clone()),
            description: self
                .description
                .clone()
                .or_else(|| item.description.clone()),
            completed: self.completed.unwrap_or(item.completed),
        }
    }
}
