//! Item-level operations on a list aggregate.
//!
//! Every operation loads the owning list, mutates its item collection and
//! commits the whole list through `ListRepository::save`. A missing list is
//! reported as `Ok(None)` / `Ok(false)`, never as an error.

use crate::error::TodoError;
use crate::keys;
use crate::model::{normalize, require_text, ItemId, ItemPatch, ListId, NewTodoItem, TodoItem};
use crate::repository::{positive_id, ListRepository};
use crate::Result;

/// Operations on the items embedded in a `TodoList`.
#[derive(Clone, Debug)]
pub struct ItemOperations {
    lists: ListRepository,
}

impl ItemOperations {
    /// Layer item operations over a list repository.
    #[must_use]
    pub const fn new(lists: ListRepository) -> Self {
        Self { lists }
    }

    /// The list repository these operations commit through.
    #[must_use]
    pub const fn lists(&self) -> &ListRepository {
        &self.lists
    }

    /// All items of a list, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Record` or `TodoError::Store` on persistence failure.
    pub async fn list_items(&self, list_id: ListId) -> Result<Option<Vec<TodoItem>>> {
        Ok(self.lists.get(list_id).await?.map(|list| list.items))
    }

    /// One item of a list.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Record` or `TodoError::Store` on persistence failure.
    pub async fn get_item(&self, list_id: ListId, item_id: ItemId) -> Result<Option<TodoItem>> {
        Ok(self
            .lists
            .get(list_id)
            .await?
            .and_then(|list| list.find_item(item_id).cloned()))
    }

    /// Append a new item to a list.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Invalid` for a blank title, or
    /// `TodoError::DuplicateTitle` if an item in the same list has the same
    /// normalized title.
    pub async fn create_item(&self, list_id: ListId, data: NewTodoItem) -> Result<Option<TodoItem>> {
        require_text("title", &data.title)?;
        let Some(mut list) = self.lists.get(list_id).await? else {
            return Ok(None);
        };

        if list.title_taken(&data.title, None) {
            return Err(TodoError::DuplicateTitle { title: data.title });
        }

        let item = TodoItem {
            id: self.next_item_id(list_id).await?,
            title: data.title,
            description: data.description,
            completed: data.completed,
        };
        list.items.push(item.clone());
        self.lists.save(&list).await?;

        tracing::info!(list_id = %list_id, item_id = %item.id, "Created todo item");
        Ok(Some(item))
    }

    /// Apply a partial update to an item, keeping its position.
    ///
    /// Title uniqueness is re-checked only when the normalized title changes.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Invalid` if the patched title is blank, or
    /// `TodoError::DuplicateTitle` if the new title collides with another item
    /// in the same list.
    pub async fn update_item(
        &self,
        list_id: ListId,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> Result<Option<TodoItem>> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        let Some(mut list) = self.lists.get(list_id).await? else {
            return Ok(None);
        };
        let Some(index) = list.position_of(item_id) else {
            return Ok(None);
        };

        let updated = patch.apply_to(&list.items[index]);
        if normalize(&updated.title) != normalize(&list.items[index].title)
            && list.title_taken(&updated.title, Some(item_id))
        {
            return Err(TodoError::DuplicateTitle {
                title: updated.title,
            });
        }

        list.items[index] = updated.clone();
        self.lists.save(&list).await?;

        tracing::info!(list_id = %list_id, item_id = %item_id, "Updated todo item");
        Ok(Some(updated))
    }

    /// Flip an item's completion flag.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Record` or `TodoError::Store` on persistence failure.
    pub async fn toggle_completion(
        &self,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Option<TodoItem>> {
        let Some(mut list) = self.lists.get(list_id).await? else {
            return Ok(None);
        };
        let Some(item) = list.items.iter_mut().find(|item| item.id == item_id) else {
            return Ok(None);
        };

        item.completed = !item.completed;
        let toggled = item.clone();
        self.lists.save(&list).await?;

        tracing::debug!(
            list_id = %list_id,
            item_id = %item_id,
            completed = toggled.completed,
            "Toggled todo item"
        );
        Ok(Some(toggled))
    }

    /// Mark every incomplete item completed. Returns the number changed.
    ///
    /// Writes only when something changed, so repeating the call is a no-op
    /// returning 0.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Record` or `TodoError::Store` on persistence failure.
    pub async fn complete_all(&self, list_id: ListId) -> Result<Option<usize>> {
        let Some(mut list) = self.lists.get(list_id).await? else {
            return Ok(None);
        };

        let changed = list.complete_all_items();
        if changed > 0 {
            self.lists.save(&list).await?;
        }

        tracing::info!(list_id = %list_id, completed = changed, "Completed all todo items");
        Ok(Some(changed))
    }

    /// Remove an item. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Record` or `TodoError::Store` on persistence failure.
    pub async fn delete_item(&self, list_id: ListId, item_id: ItemId) -> Result<bool> {
        let Some(mut list) = self.lists.get(list_id).await? else {
            return Ok(false);
        };
        if list.remove_item(item_id).is_none() {
            return Ok(false);
        }

        self.lists.save(&list).await?;
        tracing::info!(list_id = %list_id, item_id = %item_id, "Deleted todo item");
        Ok(true)
    }

    async fn next_item_id(&self, list_id: ListId) -> Result<ItemId> {
        let key = keys::item_counter_key(list_id);
        let next = self.lists.store().incr(&key).await?;
        positive_id(&key, next).map(ItemId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;
    use crate::model::{NewTodoList, TodoList};
    use std::sync::Arc;

    async fn setup() -> (ItemOperations, TodoList) {
        let repo = ListRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let list = repo.create(NewTodoList::new("Groceries")).await.unwrap();
        (ItemOperations::new(repo), list)
    }

    #[tokio::test]
    async fn test_create_item_allocates_per_list_ids() {
        let (items, groceries) = setup().await;
        let chores = items
            .lists()
            .create(NewTodoList::new("Chores"))
            .await
            .unwrap();

        let milk = items
            .create_item(groceries.id, NewTodoItem::new("Milk"))
            .await
            .unwrap()
            .unwrap();
        let bread = items
            .create_item(groceries.id, NewTodoItem::new("Bread"))
            .await
            .unwrap()
            .unwrap();
        let sweep = items
            .create_item(chores.id, NewTodoItem::new("Sweep"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(milk.id, ItemId::new(1));
        assert_eq!(bread.id, ItemId::new(2));
        assert_eq!(sweep.id, ItemId::new(1));
        assert!(!milk.completed);
    }

    #[tokio::test]
    async fn test_create_item_duplicate_title_same_list_only() {
        let (items, groceries) = setup().await;
        let chores = items
            .lists()
            .create(NewTodoList::new("Chores"))
            .await
            .unwrap();

        items
            .create_item(groceries.id, NewTodoItem::new("Milk"))
            .await
            .unwrap();

        let err = items
            .create_item(groceries.id, NewTodoItem::new("milk"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TodoError::DuplicateTitle {
                title: "milk".to_string()
            }
        );

        let other = items
            .create_item(chores.id, NewTodoItem::new("Milk"))
            .await
            .unwrap();
        assert!(other.is_some());
    }

    #[tokio::test]
    async fn test_missing_list_is_absent_everywhere() {
        let (items, _) = setup().await;
        let missing = ListId::new(404);
        let item = ItemId::new(1);

        assert_eq!(items.list_items(missing).await.unwrap(), None);
        assert_eq!(items.get_item(missing, item).await.unwrap(), None);
        assert_eq!(
            items
                .create_item(missing, NewTodoItem::new("x"))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            items
                .update_item(missing, item, ItemPatch::default())
                .await
                .unwrap(),
            None
        );
        assert_eq!(items.toggle_completion(missing, item).await.unwrap(), None);
        assert_eq!(items.complete_all(missing).await.unwrap(), None);
        assert!(!items.delete_item(missing, item).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_item_keeps_position_and_unset_fields() {
        let (items, list) = setup().await;
        for title in ["a", "b", "c"] {
            items
                .create_item(list.id, NewTodoItem::new(title).with_description("d"))
                .await
                .unwrap();
        }

        let updated = items
            .update_item(
                list.id,
                ItemId::new(2),
                ItemPatch {
                    title: Some("B2".to_string()),
                    ..ItemPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "B2");
        assert_eq!(updated.description.as_deref(), Some("d"));

        let titles: Vec<String> = items
            .list_items(list.id)
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["a", "B2", "c"]);
    }

    #[tokio::test]
    async fn test_update_item_title_collision() {
        let (items, list) = setup().await;
        items
            .create_item(list.id, NewTodoItem::new("Milk"))
            .await
            .unwrap();
        items
            .create_item(list.id, NewTodoItem::new("Bread"))
            .await
            .unwrap();

        let err = items
            .update_item(
                list.id,
                ItemId::new(2),
                ItemPatch {
                    title: Some("MILK".to_string()),
                    ..ItemPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::DuplicateTitle { .. }));

        // Re-casing an item's own title is not a collision.
        let recased = items
            .update_item(
                list.id,
                ItemId::new(1),
                ItemPatch {
                    title: Some("MILK".to_string()),
                    ..ItemPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(recased.map(|i| i.title), Some("MILK".to_string()));
    }

    #[tokio::test]
    async fn test_blank_titles_keep_the_list_readable() {
        let (items, list) = setup().await;
        let milk = items
            .create_item(list.id, NewTodoItem::new("Milk"))
            .await
            .unwrap()
            .unwrap();

        let err = items
            .create_item(list.id, NewTodoItem::new("   "))
            .await
            .unwrap_err();
        assert_eq!(err, TodoError::Invalid { field: "title" });

        let err = items
            .update_item(
                list.id,
                milk.id,
                ItemPatch {
                    title: Some(String::new()),
                    ..ItemPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, TodoError::Invalid { field: "title" });

        assert_eq!(
            items.list_items(list.id).await.unwrap(),
            Some(vec![milk])
        );
        assert_eq!(items.lists().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_item_is_none() {
        let (items, list) = setup().await;
        let result = items
            .update_item(list.id, ItemId::new(5), ItemPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let (items, list) = setup().await;
        let item = items
            .create_item(list.id, NewTodoItem::new("Milk"))
            .await
            .unwrap()
            .unwrap();

        let once = items
            .toggle_completion(list.id, item.id)
            .await
            .unwrap()
            .unwrap();
        assert!(once.completed);
        let twice = items
            .toggle_completion(list.id, item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(twice.completed, item.completed);
    }

    #[tokio::test]
    async fn test_complete_all_is_idempotent() {
        let (items, list) = setup().await;
        for title in ["a", "b", "c"] {
            items
                .create_item(list.id, NewTodoItem::new(title))
                .await
                .unwrap();
        }
        items
            .create_item(list.id, NewTodoItem::new("done").with_completed(true))
            .await
            .unwrap();

        assert_eq!(items.complete_all(list.id).await.unwrap(), Some(3));
        assert_eq!(items.complete_all(list.id).await.unwrap(), Some(0));
        let all = items.list_items(list.id).await.unwrap().unwrap();
        assert!(all.iter().all(|i| i.completed));
    }

    #[tokio::test]
    async fn test_delete_item() {
        let (items, list) = setup().await;
        let item = items
            .create_item(list.id, NewTodoItem::new("Milk"))
            .await
            .unwrap()
            .unwrap();

        assert!(items.delete_item(list.id, item.id).await.unwrap());
        assert!(!items.delete_item(list.id, item.id).await.unwrap());
        assert_eq!(items.list_items(list.id).await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_item_ids_not_reused_after_delete() {
        let (items, list) = setup().await;
        let first = items
            .create_item(list.id, NewTodoItem::new("Milk"))
            .await
            .unwrap()
            .unwrap();
        items.delete_item(list.id, first.id).await.unwrap();

        let second = items
            .create_item(list.id, NewTodoItem::new("Milk"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.id, ItemId::new(2));
    }
}
