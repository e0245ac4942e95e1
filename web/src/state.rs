//! Application state for Axum handlers.

use std::sync::Arc;
use todo_kv_core::{ItemOperations, ListRepository};
use todo_kv_runtime::{CompleteAllHandler, JobRunner, MetricsExporter};

/// Application state shared across all HTTP handlers.
///
/// Constructed once by the binary's composition root; every field is cheap
/// to clone.
#[derive(Clone, Debug)]
pub struct AppState {
    /// List persistence
    pub lists: ListRepository,

    /// Item operations over `lists`
    pub items: ItemOperations,

    /// Background job runner
    pub jobs: Arc<JobRunner>,

    /// Handler submitted by the complete-all endpoint
    pub complete_all: Arc<CompleteAllHandler>,

    /// Prometheus exporter; `/metrics` answers 404 when absent
    pub metrics: Option<Arc<MetricsExporter>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(lists: ListRepository, jobs: Arc<JobRunner>) -> Self {
        let items = ItemOperations::new(lists.clone());
        let complete_all = Arc::new(CompleteAllHandler::new(items.clone()));
        Self {
            lists,
            items,
            jobs,
            complete_all,
            metrics: None,
        }
    }

    /// Serve metrics from `exporter`.
    #[must_use]
    pub fn with_metrics(mut self, exporter: MetricsExporter) -> Self {
        self.metrics = Some(Arc::new(exporter));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_kv_core::{InMemoryKeyValueStore, JobStore};
    use todo_kv_runtime::JobRunnerConfig;

    #[test]
    fn test_state_is_clone() {
        // Axum requires Clone state
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_items_share_the_list_store() {
        let lists = ListRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let jobs = Arc::new(JobRunner::start(
            JobStore::new(Arc::new(InMemoryKeyValueStore::new())),
            &JobRunnerConfig::default(),
        ));
        let state = AppState::new(lists, jobs);

        let list = state
            .lists
            .create(todo_kv_core::NewTodoList::new("Shared"))
            .await
            .unwrap();
        assert_eq!(
            state.items.list_items(list.id).await.unwrap(),
            Some(Vec::new())
        );
        assert!(state.metrics.is_none());

        state.jobs.shutdown().await;
    }
}
