//! Axum HTTP API for the todo-list service.
//!
//! A thin shell over `todo-kv-core` and `todo-kv-runtime`: handlers parse and
//! validate the request, call `ListRepository`, `ItemOperations` or
//! `JobRunner`, and map the outcome to a status code.
//!
//! # Request Flow
//!
//! 1. **Correlation ID** assigned by the middleware and attached to the span
//! 2. **Extract** path parameters and the validated JSON body
//! 3. **Call** the repository, item operations or job runner
//! 4. **Map** absence to 404, conflicts to 400, store failures to 500
//!
//! # Example
//!
//! ```ignore
//! use todo_kv_web::{build_router, AppState};
//!
//! let state = AppState::new(lists, Arc::new(runner));
//! let app = build_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, ValidJson, Validate};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
