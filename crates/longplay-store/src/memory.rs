//! In-memory store.

use crate::{KvStore, Namespace, StoreKey};
use async_trait::async_trait;
use dashmap::DashMap;
use longplay_core::Result;

/// Lock-free in-memory key-value store.
///
/// Used by default and throughout the test suites; contents vanish with the
/// process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<StoreKey, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total stored bytes across all namespaces.
    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.clone(), value);
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn contains(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn list(&self, namespace: Namespace) -> Result<Vec<StoreKey>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.key().namespace == namespace)
            .map(|entry| entry.key().clone())
            .collect())
    }
}
