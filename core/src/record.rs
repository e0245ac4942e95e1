//! Persisted record schema for list aggregates.
//!
//! A list is stored as one JSON document:
//!
//! ```json
//! {"id": 1, "name": "Groceries", "items": [
//!     {"id": 1, "title": "Milk", "description": null, "completed": false}
//! ]}
//! ```
//!
//! Records are validated on read. A record that does not decode, or that
//! decodes into something the domain forbids (zero IDs, blank names, an ID
//! that disagrees with its key), is reported as `RecordError::Malformed`.

use crate::error::RecordError;
use crate::keys;
use crate::model::{ItemId, ListId, TodoItem, TodoList};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct ListRecord {
    id: u64,
    name: String,
    items: Vec<ItemRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemRecord {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
}

impl From<&TodoList> for ListRecord {
    fn from(list: &TodoList) -> Self {
        Self {
            id: list.id.get(),
            name: list.name.clone(),
            items: list
                .items
                .iter()
                .map(|item| ItemRecord {
                    id: item.id.get(),
                    title: item.title.clone(),
                    description: item.description.clone(),
                    completed: item.completed,
                })
                .collect(),
        }
    }
}

/// Encode a list aggregate for storage.
///
/// # Errors
///
/// Returns `RecordError::Encode` if JSON serialization fails.
pub fn encode_list(list: &TodoList) -> Result<String, RecordError> {
    serde_json::to_string(&ListRecord::from(list)).map_err(|e| RecordError::Encode(e.to_string()))
}

/// Decode and validate the list record stored at `key`.
///
/// # Errors
///
/// Returns `RecordError::Malformed` if the value is not a valid list record.
pub fn decode_list(key: &str, raw: &str) -> Result<TodoList, RecordError> {
    let malformed = |reason: String| RecordError::Malformed {
        key: key.to_string(),
        reason,
    };

    let record: ListRecord = serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;

    if record.id == 0 {
        return Err(malformed("list id must be positive".to_string()));
    }
    if let Some(key_id) = keys::parse_list_key(key) {
        if key_id.get() != record.id {
            return Err(malformed(format!(
                "record id {} does not match key",
                record.id
            )));
        }
    }
    if record.name.trim().is_empty() {
        return Err(malformed("list name is empty".to_string()));
    }

    let mut items = Vec::with_capacity(record.items.len());
    for item in record.items {
        if item.id == 0 {
            return Err(malformed("item id must be positive".to_string()));
        }
        if item.title.trim().is_empty() {
            return Err(malformed(format!("item {} has an empty title", item.id)));
        }
        items.push(TodoItem {
            id: ItemId::new(item.id),
            title: item.title,
            description: item.description,
            completed: item.completed,
        });
    }

    Ok(TodoList {
        id: ListId::new(record.id),
        name: record.name,
        items,
    })
}
