//! Local filesystem storage implementation

use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage
///
/// Files land under `base_path/<key>` and are served under
/// `base_url/<key>`. With an empty `base_url` the returned URLs are
/// relative (e.g. `/optimized/abc.jpg`), matching a same-origin serving
/// setup.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path`, creating the
    /// directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Root directory files are stored under.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Convert a storage key to a filesystem path, rejecting keys that
    /// could escape the storage root.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.is_empty() {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid characters: {}",
                key
            )));
        }

        Ok(self.base_path.join(key))
    }

    fn key_to_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(&self, key: &str, data: Vec<u8>) -> StorageResult<String> {
        let path = self.key_to_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", path.display(), e)))?;
        file.write_all(&data)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", path.display(), e)))?;
        file.flush().await?;

        tracing::debug!(key, bytes = data.len(), "Stored file");
        Ok(self.key_to_url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage_in(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), String::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_relative_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;

        let url = storage
            .store("optimized/abc.jpg", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(url, "/optimized/abc.jpg");
        let on_disk = std::fs::read(dir.path().join("optimized/abc.jpg")).unwrap();
        assert_eq!(on_disk, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_store_prefixes_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/".to_string())
            .await
            .unwrap();

        let url = storage
            .store("thumbnails/abc_thumb.jpg", vec![0])
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/thumbnails/abc_thumb.jpg");
    }

    #[tokio::test]
    async fn test_traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;

        for key in ["../escape.jpg", "/absolute.jpg", ""] {
            let result = storage.store(key, vec![0]).await;
            assert!(matches!(result, Err(StorageError::InvalidKey(_))), "{key}");
        }
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;

        storage.store("optimized/gone.jpg", vec![7]).await.unwrap();
        storage.delete("optimized/gone.jpg").await.unwrap();

        assert!(!dir.path().join("optimized/gone.jpg").exists());
    }
}
