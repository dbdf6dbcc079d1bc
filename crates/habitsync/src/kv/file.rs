//! JSON-file key-value store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use habitsync_core::kv::{KeyValueStore, KvError, Result};

/// Key-value store backed by a single JSON object file.
///
/// The file is a flat `{"key": "value"}` object, which is exactly the shape
/// of an exported legacy-storage dump. The whole map is loaded at open time
/// and rewritten after every mutation, which is fine at legacy-dump sizes.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    path: PathBuf,
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl FileKvStore {
    /// Opens a store, loading entries from `path` if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|e| KvError::Serialization(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(KvError::Io(e.to_string())),
        };

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    async fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| KvError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| KvError::Io(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.write().await;
        let mut changed = false;
        for key in keys {
            changed |= entries.remove(*key).is_some();
        }
        if changed {
            self.flush(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        let store = FileKvStore::open(&path).await.unwrap();
        assert_eq!(store.get_item("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        let store = FileKvStore::open(&path).await.unwrap();
        store.set_item("user_name", "Ada").await.unwrap();
        drop(store);

        let reopened = FileKvStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get_item("user_name").await.unwrap().as_deref(),
            Some("Ada")
        );
    }

    #[tokio::test]
    async fn test_multi_remove_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        let store = FileKvStore::open(&path).await.unwrap();
        store.set_item("a", "1").await.unwrap();
        store.set_item("b", "2").await.unwrap();
        store.multi_remove(&["a", "b"]).await.unwrap();

        let reopened = FileKvStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_item("a").await.unwrap(), None);
        assert_eq!(reopened.get_item("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = FileKvStore::open(&path).await.unwrap_err();
        assert!(matches!(err, KvError::Serialization(_)));
    }
}
