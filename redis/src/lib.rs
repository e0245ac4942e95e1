//! Redis implementation of the `KeyValueStore` trait.
//!
//! Each trait method maps to a single Redis command, so every operation is
//! atomic on the server:
//!
//! | Operation     | Command                 |
//! |---------------|-------------------------|
//! | `get`         | `GET`                   |
//! | `set`         | `SET`                   |
//! | `delete`      | `DEL`                   |
//! | `exists`      | `EXISTS`                |
//! | `incr`        | `INCR`                  |
//! | `scan_prefix` | `SCAN ... MATCH p*` loop |
//!
//! Prefix scans use the cursor-based `SCAN` rather than `KEYS` so a large
//! keyspace never blocks the server.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_kv_core::ListRepository;
//! use todo_kv_redis::RedisKeyValueStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Database 1 holds list data; database 0 is used for job records.
//! let store = RedisKeyValueStore::new("redis://127.0.0.1:6379/1").await?;
//! let repository = ListRepository::new(Arc::new(store));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use futures::future::BoxFuture;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use todo_kv_core::kv::{KeyValueStore, StoreResult};
use todo_kv_core::StoreError;

/// Number of keys requested per `SCAN` round-trip.
const SCAN_BATCH: usize = 500;

/// `KeyValueStore` backed by a Redis database.
///
/// # Thread Safety
///
/// This type is `Clone`; clones share the same `ConnectionManager`, which
/// multiplexes commands over one connection and reconnects automatically.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    conn_manager: ConnectionManager,
}

impl RedisKeyValueStore {
    /// Connect to Redis.
    ///
    /// # Connection URL Format
    ///
    /// - TCP: `redis://[:password@]host[:port][/database]`
    /// - TLS: `rediss://[:password@]host[:port][/database]`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the URL is malformed or the server
    /// cannot be reached.
    pub async fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisKeyValueStore initialized successfully");

        Ok(Self { conn_manager })
    }
}

impl std::fmt::Debug for RedisKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKeyValueStore").finish_non_exhaustive()
    }
}

fn store_error(operation: &str, key: &str, error: &RedisError) -> StoreError {
    let message = format!("{operation} '{key}' failed: {error}");
    if error.is_io_error()
        || error.is_connection_refusal()
        || error.is_connection_dropped()
        || error.is_timeout()
    {
        StoreError::Connection(message)
    } else {
        StoreError::Command(message)
    }
}

/// Escape glob metacharacters so the prefix matches literally.
fn match_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

impl RedisKeyValueStore {
    async fn get_value(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn_manager.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| store_error("GET", key, &e))?;
        Ok(value)
    }

    async fn set_value(&self, key: &str, value: String) -> StoreResult<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| store_error("SET", key, &e))?;
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn_manager.clone();
        let deleted: i64 = conn.del(key).await.map_err(|e| store_error("DEL", key, &e))?;
        Ok(deleted > 0)
    }

    async fn key_exists(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn_manager.clone();
        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| store_error("EXISTS", key, &e))?;
        Ok(exists)
    }

    async fn scan_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.conn_manager.clone();
        let pattern = match_pattern(prefix);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| store_error("SCAN", prefix, &e))?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once across iterations.
        keys.sort_unstable();
        keys.dedup();

        tracing::trace!(prefix = prefix, count = keys.len(), "Scanned keys");
        Ok(keys)
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn_manager.clone();
        let value: i64 = conn
            .incr(key, 1_i64)
            .await
            .map_err(|e| store_error("INCR", key, &e))?;
        Ok(value)
    }
}

impl KeyValueStore for RedisKeyValueStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<Option<String>>> {
        Box::pin(self.get_value(key))
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(self.set_value(key, value))
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        Box::pin(self.delete_key(key))
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        Box::pin(self.key_exists(key))
    }

    fn scan_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, StoreResult<Vec<String>>> {
        Box::pin(self.scan_keys(prefix))
    }

    fn incr<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<i64>> {
        Box::pin(self.increment(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_pattern_escapes_globs() {
        assert_eq!(match_pattern("todolist:"), "todolist:*");
        assert_eq!(match_pattern("a*b?[c]"), "a\\*b\\?\\[c\\]*");
    }
}
