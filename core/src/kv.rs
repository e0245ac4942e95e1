//! Key-value store abstraction.
//!
//! The service persists everything through this trait: list aggregates, ID
//! counters and job status records. Backends only need atomic single-key
//! operations; there are no multi-key transactions.
//!
//! # Implementations
//!
//! - `InMemoryKeyValueStore` (this crate): tests and single-process runs
//! - `RedisKeyValueStore` (`todo-kv-redis` crate): production
//!
//! # Dyn Compatibility
//!
//! Methods return `BoxFuture` rather than using `async fn` so the store can
//! be shared as `Arc<dyn KeyValueStore>` and the backend picked at startup.

use crate::error::StoreError;
use futures::future::BoxFuture;

/// Result of a store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// String key-value store with an atomic counter primitive.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<Option<String>>>;

    /// Write `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, StoreResult<()>>;

    /// Remove `key`. Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>>;

    /// Whether a value exists at `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>>;

    /// All keys starting with `prefix`, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails.
    fn scan_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, StoreResult<Vec<String>>>;

    /// Atomically increment the integer counter at `key` and return the new
    /// value. A missing counter counts as 0, so the first call returns 1.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails or the key holds a non-integer.
    fn incr<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<i64>>;
}
