//! In-memory key-value store.

use crate::error::StoreError;
use crate::kv::{KeyValueStore, StoreResult};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// `HashMap`-backed `KeyValueStore`.
///
/// Every operation takes the map lock once, so each call is atomic just like
/// a single Redis command. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<Option<String>>> {
        Box::pin(async move { Ok(self.entries.lock().await.get(key).cloned()) })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            self.entries.lock().await.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        Box::pin(async move { Ok(self.entries.lock().await.remove(key).is_some()) })
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        Box::pin(async move { Ok(self.entries.lock().await.contains_key(key)) })
    }

    fn scan_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, StoreResult<Vec<String>>> {
        Box::pin(async move {
            let entries = self.entries.lock().await;
            Ok(entries
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect())
        })
    }

    fn incr<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<i64>> {
        Box::pin(async move {
            let mut entries = self.entries.lock().await;
            let current = match entries.get(key) {
                Some(raw) => raw.parse::<i64>().map_err(|_| {
                    StoreError::Command(format!("value at '{key}' is not an integer"))
                })?,
                None => 0,
            };
            let next = current
                .checked_add(1)
                .ok_or_else(|| StoreError::Command(format!("counter at '{key}' would overflow")))?;
            entries.insert(key.to_string(), next.to_string());
            Ok(next)
        })
    }
}
