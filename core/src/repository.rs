//! Persistence of `TodoList` aggregates.
//!
//! Each list is stored whole at `todolist:{id}`; list IDs come from the
//! `todolist:next_id` counter. The repository hands out owned copies, so
//! callers mutate a snapshot and commit it with `save`.

use crate::error::TodoError;
use crate::keys;
use crate::kv::KeyValueStore;
use crate::model::{normalize, require_text, ListId, ListPatch, NewTodoList, TodoList};
use crate::record::{decode_list, encode_list};
use crate::Result;
use std::sync::Arc;

/// Outcome of a full scan over stored lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListScan {
    /// Lists that decoded successfully
    pub lists: Vec<TodoList>,
    /// Keys whose records failed validation
    pub quarantined: Vec<String>,
}

/// Repository for `TodoList` aggregates.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct ListRepository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ListRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListRepository").finish_non_exhaustive()
    }
}

impl ListRepository {
    /// Create a repository over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying store (used for the per-list item counters).
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Load every stored list, reporting malformed records separately.
    ///
    /// Malformed records are logged and left untouched in the store.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store fails.
    pub async fn scan(&self) -> Result<ListScan> {
        let keys = self.store.scan_prefix(keys::LIST_PREFIX).await?;
        let mut scan = ListScan::default();

        for key in keys {
            if keys::parse_list_key(&key).is_none() {
                continue;
            }
            // The key may have been deleted between SCAN and GET.
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            match decode_list(&key, &raw) {
                Ok(list) => scan.lists.push(list),
                Err(error) => {
                    tracing::warn!(key = %key, error = %error, "Quarantined malformed list record");
                    scan.quarantined.push(key);
                }
            }
        }

        Ok(scan)
    }

    /// Load every well-formed list. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<TodoList>> {
        Ok(self.scan().await?.lists)
    }

    /// Load one list.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Record` if the stored record is malformed, or
    /// `TodoError::Store` if the store fails.
    pub async fn get(&self, id: ListId) -> Result<Option<TodoList>> {
        let key = keys::list_key(id);
        match self.store.get(&key).await? {
            Some(raw) => Ok(Some(decode_list(&key, &raw)?)),
            None => Ok(None),
        }
    }

    /// Create an empty list with a freshly allocated ID.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Invalid` for a blank name, or
    /// `TodoError::DuplicateName` if another list has the same normalized
    /// name.
    pub async fn create(&self, request: NewTodoList) -> Result<TodoList> {
        require_text("name", &request.name)?;
        if self.name_exists(&request.name, None).await? {
            return Err(TodoError::DuplicateName { name: request.name });
        }

        let id = self.next_list_id().await?;
        let list = TodoList::new(id, request.name);
        self.save(&list).await?;

        tracing::info!(list_id = %list.id, name = %list.name, "Created todo list");
        Ok(list)
    }

    /// Rename a list, keeping its items.
    ///
    /// Returns `Ok(None)` if the list does not exist.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Invalid` for a blank name, or
    /// `TodoError::DuplicateName` if another list has the same normalized
    /// name.
    pub async fn update(&self, id: ListId, patch: ListPatch) -> Result<Option<TodoList>> {
        require_text("name", &patch.name)?;
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        if self.name_exists(&patch.name, Some(id)).await? {
            return Err(TodoError::DuplicateName { name: patch.name });
        }

        let updated = TodoList {
            id,
            name: patch.name,
            items: existing.items,
        };
        self.save(&updated).await?;

        tracing::info!(list_id = %id, name = %updated.name, "Updated todo list");
        Ok(Some(updated))
    }

    /// Delete a list. Returns whether a record was removed.
    ///
    /// The list's item counter is kept so item IDs are never reused.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Store` if the store fails.
    pub async fn delete(&self, id: ListId) -> Result<bool> {
        let removed = self.store.delete(&keys::list_key(id)).await?;
        if removed {
            tracing::info!(list_id = %id, "Deleted todo list");
        }
        Ok(removed)
    }

    /// Overwrite the stored aggregate. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Record` if encoding fails or `TodoError::Store` if
    /// the store fails.
    pub async fn save(&self, list: &TodoList) -> Result<()> {
        let raw = encode_list(list)?;
        self.store.set(&keys::list_key(list.id), raw).await?;
        tracing::debug!(list_id = %list.id, items = list.items.len(), "Saved todo list");
        Ok(())
    }

    async fn next_list_id(&self) -> Result<ListId> {
        let next = self.store.incr(keys::LIST_COUNTER).await?;
        positive_id(keys::LIST_COUNTER, next).map(ListId::new)
    }

    async fn name_exists(&self, name: &str, exclude: Option<ListId>) -> Result<bool> {
        let wanted = normalize(name);
        Ok(self
            .list_all()
            .await?
            .iter()
            .filter(|list| Some(list.id) != exclude)
            .any(|list| normalize(&list.name) == wanted))
    }
}

/// Convert a counter value into an ID, rejecting non-positive values.
pub(crate) fn positive_id(counter: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            TodoError::Store(crate::error::StoreError::Command(format!(
                "counter '{counter}' returned non-positive value {value}"
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;
    use crate::model::{ItemId, TodoItem};

    fn repository() -> (ListRepository, InMemoryKeyValueStore) {
        let store = InMemoryKeyValueStore::new();
        (ListRepository::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_ids() {
        let (repo, _) = repository();

        let first = repo.create(NewTodoList::new("Groceries")).await.unwrap();
        let second = repo.create(NewTodoList::new("Chores")).await.unwrap();

        assert_eq!(first.id, ListId::new(1));
        assert_eq!(second.id, ListId::new(2));
        assert!(first.items.is_empty());
        assert_eq!(repo.get(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let (repo, _) = repository();
        repo.create(NewTodoList::new("Groceries")).await.unwrap();

        let err = repo
            .create(NewTodoList::new("  groceries "))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TodoError::DuplicateName {
                name: "  groceries ".to_string()
            }
        );
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_items_and_allows_own_name() {
        let (repo, _) = repository();
        let mut list = repo.create(NewTodoList::new("Groceries")).await.unwrap();
        list.items.push(TodoItem {
            id: ItemId::new(1),
            title: "Milk".to_string(),
            description: None,
            completed: false,
        });
        repo.save(&list).await.unwrap();

        let updated = repo
            .update(list.id, ListPatch::new("GROCERIES"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "GROCERIES");
        assert_eq!(updated.items, list.items);
    }

    #[tokio::test]
    async fn test_update_rejects_other_lists_name() {
        let (repo, _) = repository();
        repo.create(NewTodoList::new("Groceries")).await.unwrap();
        let chores = repo.create(NewTodoList::new("Chores")).await.unwrap();

        let err = repo
            .update(chores.id, ListPatch::new("groceries"))
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::DuplicateName { .. }));
    }

    #[tokio::test]
    async fn test_blank_names_are_rejected_before_writing() {
        let (repo, store) = repository();

        let err = repo.create(NewTodoList::new("   ")).await.unwrap_err();
        assert_eq!(err, TodoError::Invalid { field: "name" });
        assert!(store.is_empty().await);

        let list = repo.create(NewTodoList::new("Groceries")).await.unwrap();
        let err = repo.update(list.id, ListPatch::new("")).await.unwrap_err();
        assert_eq!(err, TodoError::Invalid { field: "name" });
        assert_eq!(repo.get(list.id).await.unwrap(), Some(list));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_list_is_none() {
        let (repo, _) = repository();
        let result = repo.update(ListId::new(9), ListPatch::new("x")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (repo, _) = repository();
        let list = repo.create(NewTodoList::new("Groceries")).await.unwrap();

        assert!(repo.delete(list.id).await.unwrap());
        assert!(!repo.delete(list.id).await.unwrap());
        assert_eq!(repo.get(list.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let (repo, _) = repository();
        let first = repo.create(NewTodoList::new("A")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.create(NewTodoList::new("A")).await.unwrap();
        assert_eq!(second.id, ListId::new(2));
    }

    #[tokio::test]
    async fn test_scan_quarantines_malformed_records() {
        let (repo, store) = repository();
        repo.create(NewTodoList::new("Good")).await.unwrap();
        store
            .set("todolist:99", "{broken".to_string())
            .await
            .unwrap();

        let scan = repo.scan().await.unwrap();
        assert_eq!(scan.lists.len(), 1);
        assert_eq!(scan.quarantined, vec!["todolist:99".to_string()]);

        let err = repo.get(ListId::new(99)).await.unwrap_err();
        assert!(matches!(err, TodoError::Record(_)));
    }

    #[tokio::test]
    async fn test_list_all_skips_counter_key() {
        let (repo, store) = repository();
        repo.create(NewTodoList::new("A")).await.unwrap();
        assert!(store.exists(keys::LIST_COUNTER).await.unwrap());

        let scan = repo.scan().await.unwrap();
        assert_eq!(scan.lists.len(), 1);
        assert!(scan.quarantined.is_empty());
    }
}
