//! Composition root for the todo-kv server.
//!
//! [`Config`] is read from the environment; [`TodoApp`] turns it into
//! connected stores, a running job runner and the HTTP router.

#![forbid(unsafe_code)]

pub mod app;
pub mod config;

pub use app::TodoApp;
pub use config::{Config, ConfigError, StoreBackend};
