//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod health;
pub mod items;
pub mod jobs;
pub mod lists;

// Re-export common handler utilities
pub use health::{health_check, metrics, readiness_check, root};
