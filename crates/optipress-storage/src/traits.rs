//! Storage abstraction trait

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Backends persist a buffer under a key and return the publicly
/// retrievable URL for it. The optimization core never keeps buffers
/// after handing them to storage.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `data` under `key` and return its public URL.
    async fn store(&self, key: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Delete a previously stored file.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
