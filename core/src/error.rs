//! Error types for storage and domain operations.
//!
//! "Not found" is never an error here: lookups return `Ok(None)` or
//! `Ok(false)` and the API layer maps absence to 404.

use thiserror::Error;

/// Errors raised by a `KeyValueStore` backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Store connection error: {0}")]
    Connection(String),

    /// A command was rejected or returned an unexpected reply.
    #[error("Store command failed: {0}")]
    Command(String),
}

/// A persisted record that does not match the expected schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The stored value could not be decoded.
    #[error("Malformed record at '{key}': {reason}")]
    Malformed {
        /// Key the record was read from
        key: String,
        /// Decoder message
        reason: String,
    },

    /// The value could not be encoded.
    #[error("Failed to encode record: {0}")]
    Encode(String),
}

/// Errors returned by `ListRepository` and `ItemOperations`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Another list already uses this name (case-insensitive, trimmed).
    #[error("A list with the name '{name}' already exists")]
    DuplicateName {
        /// The rejected name, as supplied
        name: String,
    },

    /// Another item in the same list already uses this title.
    #[error("A task with title '{title}' already exists in this list")]
    DuplicateTitle {
        /// The rejected title, as supplied
        title: String,
    },

    /// A name or title is empty after trimming.
    #[error("{field} must not be empty")]
    Invalid {
        /// Offending field, `name` or `title`
        field: &'static str,
    },

    /// A stored aggregate failed to decode or encode.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The key-value store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    /// Whether this is a validation conflict (as opposed to an infrastructure failure).
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateName { .. } | Self::DuplicateTitle { .. })
    }
}
