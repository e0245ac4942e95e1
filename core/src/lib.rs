//! # Todo KV Core
//!
//! Domain model and persistence layer for the todo-list service.
//!
//! Todo lists are stored as whole aggregates (list metadata plus embedded
//! items) in a string key-value store. Everything that mutates an item loads
//! the owning list, changes it in memory and writes the whole list back.
//!
//! ## Components
//!
//! - **`KeyValueStore`**: get/set/delete/exists/scan/increment over string keys
//! - **`ListRepository`**: persistence of `TodoList` aggregates and list IDs
//! - **`ItemOperations`**: item-level operations inside an aggregate
//! - **`JobStore`**: status records for background jobs
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use todo_kv_core::{InMemoryKeyValueStore, ItemOperations, ListRepository, NewTodoItem, NewTodoList};
//!
//! # tokio_test::block_on(async {
//! let repository = ListRepository::new(Arc::new(InMemoryKeyValueStore::new()));
//! let items = ItemOperations::new(repository.clone());
//!
//! let list = repository.create(NewTodoList::new("Groceries")).await?;
//! let milk = items.create_item(list.id, NewTodoItem::new("Milk")).await?;
//! assert!(milk.is_some());
//! # Ok::<(), todo_kv_core::TodoError>(())
//! # });
//! ```
//!
//! ## Consistency
//!
//! Uniqueness checks and item mutations are read-validate-write sequences
//! without isolation. Two concurrent writers against the same aggregate can
//! both pass validation and the later `save` wins. ID allocation is safe under
//! concurrency because it relies only on the store's atomic increment.

#![forbid(unsafe_code)]

pub mod error;
pub mod items;
pub mod job;
pub mod keys;
pub mod kv;
pub mod memory;
pub mod model;
pub mod record;
pub mod repository;

pub use error::{RecordError, StoreError, TodoError};
pub use items::ItemOperations;
pub use job::{JobError, JobId, JobRecord, JobStatus, JobStore};
pub use kv::KeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use model::{ItemId, ItemPatch, ListId, ListPatch, NewTodoItem, NewTodoList, TodoItem, TodoList};
pub use repository::{ListRepository, ListScan};

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, TodoError>;
