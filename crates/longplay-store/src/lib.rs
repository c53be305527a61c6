//! # Longplay Store
//!
//! Persistence collaborator for longplay: a namespaced key-value store.
//!
//! Each track and segment is spread across independent entries:
//!
//! | Namespace | Value |
//! |---|---|
//! | `track/<id>` | [`TrackRecord`] (JSON) |
//! | `segment/<id>` | [`SegmentRecord`] (JSON) |
//! | `segment-data/<id>` | compressed sample bytes (opaque) |
//! | `segment-waveform/<id>` | rendered waveform image (opaque) |
//!
//! Backends:
//! - [`MemoryStore`]: lock-free in-memory map
//! - [`DirStore`]: one file per key under a root directory (`dir` feature)

pub mod key;
pub mod memory;
pub mod records;

#[cfg(feature = "dir")]
pub mod dir;

use async_trait::async_trait;
use longplay_core::Result;

pub use key::{Namespace, StoreKey};
pub use memory::MemoryStore;
pub use records::{SegmentRecord, TrackRecord};

#[cfg(feature = "dir")]
pub use dir::DirStore;

/// Asynchronous key-value store keyed by namespace and id.
///
/// Implementations must tolerate deleting absent keys. Retries, if any,
/// belong inside the implementation; callers propagate failures as-is.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>>;

    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> Result<()>;

    async fn delete(&self, key: &StoreKey) -> Result<()>;

    async fn contains(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Every key currently stored under `namespace`, in no particular order.
    async fn list(&self, namespace: Namespace) -> Result<Vec<StoreKey>>;
}
