//! # todo-kv runtime
//!
//! Background job execution for the todo-list service.
//!
//! ## Core Components
//!
//! - **`JobHandler`**: A unit of background work with a typed argument
//! - **`JobRunner`**: Worker pool that executes submitted jobs and records
//!   their status in a [`JobStore`](todo_kv_core::JobStore)
//! - **`CompleteAllHandler`**: Marks every item of a list as completed
//! - **Metrics**: Prometheus counters and histograms for job outcomes
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use todo_kv_core::{InMemoryKeyValueStore, ItemOperations, JobStore, ListRepository, NewTodoList};
//! use todo_kv_runtime::{CompleteAllHandler, JobRunner, JobRunnerConfig};
//!
//! # tokio_test::block_on(async {
//! let lists = ListRepository::new(Arc::new(InMemoryKeyValueStore::new()));
//! let list = lists.create(NewTodoList::new("Errands")).await?;
//!
//! let runner = JobRunner::start(
//!     JobStore::new(Arc::new(InMemoryKeyValueStore::new())),
//!     &JobRunnerConfig::default(),
//! );
//! let handler = Arc::new(CompleteAllHandler::new(ItemOperations::new(lists)));
//! let job_id = runner.submit(handler, list.id).await?;
//!
//! runner.shutdown().await;
//! let record = runner.status(&job_id).await?;
//! assert!(record.status.is_terminal());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

#![forbid(unsafe_code)]

/// Job handler trait and the built-in handlers
pub mod handler;

/// Prometheus metrics for observability
pub mod metrics;

/// Worker pool executing submitted jobs
pub mod runner;

pub use handler::{CompleteAllHandler, JobHandler};
pub use metrics::{JobMetrics, MetricsError, MetricsExporter};
pub use runner::{JobRunner, JobRunnerConfig};
