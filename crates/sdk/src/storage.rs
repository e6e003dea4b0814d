//! Key-value storage backing the local order cache.

use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Low-level storage backend.
#[async_trait]
pub trait StorageInterface: Send + Sync {
    /// Raw bytes stored under the key, `None` if nothing is stored.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
}

/// In-process storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl StorageInterface for MemoryStorage {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Storage keeping one file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self { Self { base_path: base_path.into() } }

    fn file_path(&self, key: &str) -> PathBuf {
        let safe_key = key.replace(['/', ':', '\\'], "_");
        self.base_path.join(format!("{safe_key}.json"))
    }
}

#[async_trait]
impl StorageInterface for FileStorage {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.file_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let path = self.file_path(key);
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        // Write to a temp file then rename, so readers never see partial data
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_bytes("a").await.unwrap(), None);
        storage.set_bytes("a", b"1".to_vec()).await.unwrap();
        storage.set_bytes("a", b"2".to_vec()).await.unwrap();
        assert_eq!(storage.get_bytes("a").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get_bytes("dca:orders").await.unwrap(), None);
        storage.set_bytes("dca:orders", b"[]".to_vec()).await.unwrap();
        assert_eq!(storage.get_bytes("dca:orders").await.unwrap(), Some(b"[]".to_vec()));
        assert!(dir.path().join("nested/dca_orders.json").exists());
    }
}
