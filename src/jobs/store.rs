//! Key-value store capability used by the job registry.
//!
//! The production backend (a Redis-style server) lives outside this crate;
//! callers hand the registry any implementation of [`KeyValueStore`]. The
//! in-memory implementation here backs tests and small deployments.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// A failed store operation, with the backend's own message.
#[derive(Error, Debug)]
#[error("store operation failed: {0}")]
pub struct StoreError(pub String);

/// Minimal key-value operations the job registry needs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetches a value; `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores a value, optionally expiring after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>)
        -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All values whose keys start with `prefix`.
    async fn values_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Number of keys starting with `prefix`.
    async fn count_with_prefix(&self, prefix: &str) -> Result<usize, StoreError>;
}

/// In-memory [`KeyValueStore`] with TTL support.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn expired(deadline: &Option<Instant>) -> bool {
        deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, deadline)) if Self::expired(deadline) => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value, deadline));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn values_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .filter(|(key, (_, deadline))| key.starts_with(prefix) && !Self::expired(deadline))
            .map(|(_, (value, _))| value.clone())
            .collect())
    }

    async fn count_with_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .filter(|(key, (_, deadline))| key.starts_with(prefix) && !Self::expired(deadline))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let store = MemoryStore::new();
        store.set("k", "v".to_string(), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn prefix_scan_and_count() {
        let store = MemoryStore::new();
        store.set("config:job:a", "1".to_string(), None).await.unwrap();
        store.set("config:job:b", "2".to_string(), None).await.unwrap();
        store.set("session:x", "3".to_string(), None).await.unwrap();

        let mut values = store.values_with_prefix("config:job:").await.unwrap();
        values.sort();
        assert_eq!(values, vec!["1", "2"]);
        assert_eq!(store.count_with_prefix("config:job:").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let store = MemoryStore::new();
        store
            .set("k", "v".to_string(), Some(Duration::from_nanos(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.count_with_prefix("k").await.unwrap(), 0);
    }
}
