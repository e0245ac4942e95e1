//! # todo-kv testing
//!
//! Testing utilities and helpers for the todo-kv workspace.
//!
//! This crate provides:
//! - Mock `KeyValueStore` implementations for error-path tests
//! - Fixtures that build in-memory repositories and job runners
//! - proptest strategies for the domain types
//!
//! ## Example
//!
//! ```
//! use todo_kv_testing::fixtures;
//!
//! # tokio_test::block_on(async {
//! let repository = fixtures::seeded_repository(&[("Groceries", &["Milk", "Eggs"][..])]).await;
//! let lists = repository.list_all().await.unwrap();
//! assert_eq!(lists[0].items.len(), 2);
//! # });
//! ```

use std::sync::Once;

/// Mock implementations of the store trait.
pub mod mocks {
    use futures::future::BoxFuture;
    use todo_kv_core::kv::{KeyValueStore, StoreResult};
    use todo_kv_core::StoreError;

    /// Store whose every operation fails with a connection error.
    ///
    /// Stands in for an unreachable Redis server.
    ///
    /// ```
    /// use todo_kv_core::KeyValueStore;
    /// use todo_kv_testing::mocks::FailingKeyValueStore;
    ///
    /// # tokio_test::block_on(async {
    /// let store = FailingKeyValueStore::new();
    /// assert!(store.get("todolist:1").await.is_err());
    /// # });
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct FailingKeyValueStore;

    impl FailingKeyValueStore {
        /// Create the store
        #[must_use]
        pub const fn new() -> Self {
            Self
        }

        fn fail<T: Send + 'static>(operation: &str, key: &str) -> BoxFuture<'static, StoreResult<T>> {
            let error = StoreError::Connection(format!("{operation} '{key}' failed: store unavailable"));
            Box::pin(async move { Err(error) })
        }
    }

    impl KeyValueStore for FailingKeyValueStore {
        fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<Option<String>>> {
            Self::fail("GET", key)
        }

        fn set<'a>(&'a self, key: &'a str, _value: String) -> BoxFuture<'a, StoreResult<()>> {
            Self::fail("SET", key)
        }

        fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
            Self::fail("DEL", key)
        }

        fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
            Self::fail("EXISTS", key)
        }

        fn scan_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, StoreResult<Vec<String>>> {
            Self::fail("SCAN", prefix)
        }

        fn incr<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<i64>> {
            Self::fail("INCR", key)
        }
    }
}

/// Builders for repositories, job runners and seeded data.
pub mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;
    use todo_kv_core::{
        InMemoryKeyValueStore, ItemOperations, JobError, JobId, JobRecord, JobStore,
        ListRepository, NewTodoItem, NewTodoList,
    };
    use todo_kv_runtime::{JobRunner, JobRunnerConfig};

    /// Empty repository over a fresh in-memory store.
    #[must_use]
    pub fn memory_repository() -> ListRepository {
        ListRepository::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    /// Repository pre-populated with `lists`, each given as a name and item titles.
    ///
    /// # Panics
    ///
    /// Panics if the seed data contains duplicates.
    #[allow(clippy::expect_used)] // Seed data is fixed by the caller
    pub async fn seeded_repository(lists: &[(&str, &[&str])]) -> ListRepository {
        let repository = memory_repository();
        let items = ItemOperations::new(repository.clone());

        for (name, titles) in lists {
            let list = repository
                .create(NewTodoList::new(*name))
                .await
                .expect("seed list");
            for title in *titles {
                items
                    .create_item(list.id, NewTodoItem::new(*title))
                    .await
                    .expect("seed item");
            }
        }

        repository
    }

    /// Job runner over a fresh in-memory job store.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn memory_job_runner() -> Arc<JobRunner> {
        Arc::new(JobRunner::start(
            JobStore::new(Arc::new(InMemoryKeyValueStore::new())),
            &JobRunnerConfig::default(),
        ))
    }

    /// Poll a job until it reaches a terminal state or `attempts` polls of
    /// 10ms have elapsed, returning the last record seen.
    ///
    /// # Errors
    ///
    /// Returns the `JobError` from the status lookup.
    pub async fn wait_for_job(
        runner: &JobRunner,
        id: &JobId,
        attempts: usize,
    ) -> Result<JobRecord, JobError> {
        let mut record = runner.status(id).await?;
        for _ in 0..attempts {
            if record.status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            record = runner.status(id).await?;
        }
        Ok(record)
    }
}

/// proptest strategies for the domain types.
pub mod strategies {
    use proptest::prelude::*;
    use todo_kv_core::{ItemId, ListId, TodoItem, TodoList};

    /// Non-blank ASCII names and titles.
    pub fn title() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,23}"
    }

    /// The same text with random letter case and surrounding whitespace.
    pub fn case_variant(text: String) -> impl Strategy<Value = String> {
        let len = text.len();
        (
            proptest::collection::vec(any::<bool>(), len),
            "[ \t]{0,2}",
            "[ \t]{0,2}",
        )
            .prop_map(move |(upper, lead, trail)| {
                let body: String = text
                    .chars()
                    .zip(upper)
                    .map(|(c, up)| {
                        if up {
                            c.to_ascii_uppercase()
                        } else {
                            c.to_ascii_lowercase()
                        }
                    })
                    .collect();
                format!("{lead}{body}{trail}")
            })
    }

    /// Any persisted item.
    pub fn todo_item() -> impl Strategy<Value = TodoItem> {
        (
            1..10_000_u64,
            title(),
            proptest::option::of("[^\u{0}]{0,40}"),
            any::<bool>(),
        )
            .prop_map(|(id, title, description, completed)| TodoItem {
                id: ItemId::new(id),
                title,
                description,
                completed,
            })
    }

    /// Any persisted list with up to `max_items` items.
    pub fn todo_list(max_items: usize) -> impl Strategy<Value = TodoList> {
        (
            1..10_000_u64,
            title(),
            proptest::collection::vec(todo_item(), 0..=max_items),
        )
            .prop_map(|(id, name, items)| TodoList {
                id: ListId::new(id),
                name,
                items,
            })
    }
}

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness's captured writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

// Re-export commonly used items
pub use fixtures::{memory_job_runner, memory_repository, seeded_repository, wait_for_job};
pub use mocks::FailingKeyValueStore;

#[cfg(test)]
mod tests {
    use super::*;
    use todo_kv_core::{KeyValueStore, ListRepository, StoreError, TodoError};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_failing_store_fails_every_operation() {
        let store = FailingKeyValueStore::new();
        assert!(matches!(
            store.incr("todolist:next_id").await,
            Err(StoreError::Connection(_))
        ));
        assert!(store.scan_prefix("todolist:").await.is_err());
        assert!(store.set("k", "v".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_repository_propagates_store_failure() {
        let repository = ListRepository::new(Arc::new(FailingKeyValueStore::new()));
        let err = repository.list_all().await.unwrap_err();
        assert!(matches!(err, TodoError::Store(StoreError::Connection(_))));
    }

    #[tokio::test]
    async fn test_seeded_repository_assigns_sequential_ids() {
        let repository = seeded_repository(&[
            ("Home", &["Dishes"][..]),
            ("Work", &["Email", "Report"][..]),
        ])
        .await;
        let mut lists = repository.list_all().await.unwrap();
        lists.sort_by_key(|list| list.id);

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Home");
        assert_eq!(lists[1].items[1].id.get(), 2);
    }
}
