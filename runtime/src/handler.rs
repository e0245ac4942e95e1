//! Job handlers.

use serde::Serialize;
use std::future::Future;
use todo_kv_core::{ItemOperations, JobError, ListId};

/// A unit of background work.
///
/// Handlers run at least once per submission from the caller's point of
/// view but may run again if a queue redelivers, so they must be safe to
/// re-run.
pub trait JobHandler: Send + Sync + 'static {
    /// Argument passed to `handle`; also stored in the job record.
    type Argument: Serialize + Send + 'static;

    /// Name recorded as the job's `kind` and used as a metrics label.
    const KIND: &'static str;

    /// Run the job and produce its result payload.
    ///
    /// # Errors
    ///
    /// Returns `JobError` describing why the job failed; the message is
    /// stored in the job record.
    fn handle(
        &self,
        argument: Self::Argument,
    ) -> impl Future<Output = Result<serde_json::Value, JobError>> + Send;
}

/// Marks every incomplete item of a list as completed.
///
/// Idempotent: on an already-completed list it finishes with `completed: 0`.
#[derive(Clone, Debug)]
pub struct CompleteAllHandler {
    items: ItemOperations,
}

impl CompleteAllHandler {
    /// Create the handler over the item operations it drives.
    #[must_use]
    pub const fn new(items: ItemOperations) -> Self {
        Self { items }
    }
}

impl JobHandler for CompleteAllHandler {
    type Argument = ListId;

    const KIND: &'static str = "complete_all";

    async fn handle(&self, list_id: ListId) -> Result<serde_json::Value, JobError> {
        let completed = self
            .items
            .complete_all(list_id)
            .await
            .map_err(|e| JobError::Handler(e.to_string()))?
            .ok_or_else(|| JobError::Handler(format!("TodoList with id {list_id} not found")))?;

        Ok(serde_json::json!({
            "completed": completed,
            "message": format!("Completed {completed} tasks"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use todo_kv_core::{InMemoryKeyValueStore, ListRepository, NewTodoItem, NewTodoList};

    #[tokio::test]
    async fn test_complete_all_handler_result() {
        let repo = ListRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let items = ItemOperations::new(repo.clone());
        let list = repo.create(NewTodoList::new("Chores")).await.unwrap();
        items
            .create_item(list.id, NewTodoItem::new("Sweep"))
            .await
            .unwrap();

        let handler = CompleteAllHandler::new(items);
        let first = handler.handle(list.id).await.unwrap();
        assert_eq!(first["completed"], 1);
        assert_eq!(first["message"], "Completed 1 tasks");

        let second = handler.handle(list.id).await.unwrap();
        assert_eq!(second["completed"], 0);
    }

    #[tokio::test]
    async fn test_complete_all_handler_missing_list() {
        let repo = ListRepository::new(Arc::new(InMemoryKeyValueStore::new()));
        let handler = CompleteAllHandler::new(ItemOperations::new(repo));

        let err = handler.handle(ListId::new(42)).await.unwrap_err();
        assert_eq!(
            err,
            JobError::Handler("TodoList with id 42 not found".to_string())
        );
    }
}
