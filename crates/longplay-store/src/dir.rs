//! Directory-backed store.

use crate::{KvStore, Namespace, StoreKey};
use async_trait::async_trait;
use longplay_core::Result;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Stores each key as `<root>/<namespace>/<id>`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a torn value behind.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for namespace in Namespace::ALL {
            fs::create_dir_all(root.join(namespace.prefix())).await?;
        }
        tracing::debug!("Opened directory store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.namespace.prefix()).join(&key.id)
    }
}

#[async_trait]
impl KvStore for DirStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> Result<()> {
        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<()> {
        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn contains(&self, key: &StoreKey) -> Result<bool> {
        Ok(fs::try_exists(self.path(key)).await?)
    }

    async fn list(&self, namespace: Namespace) -> Result<Vec<StoreKey>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(self.root.join(namespace.prefix())).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.ends_with(".tmp") {
                continue;
            }
            keys.push(StoreKey::new(namespace, name));
        }
        Ok(keys)
    }
}
