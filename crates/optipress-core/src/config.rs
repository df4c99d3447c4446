//! Configuration module
//!
//! Application configuration loaded from environment variables, with
//! sensible defaults for local development.

use std::env;
use std::time::Duration;

const SERVER_PORT: u16 = 3000;
const DEFAULT_TARGET_SIZE_BYTES: usize = 100 * 1024;
const BATCH_DEADLINE_SECS: u64 = 60;
const MAX_FILE_SIZE_MB: usize = 50;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// Maximum number of simultaneous CPU-bound optimizations, shared
    /// across all in-flight requests.
    pub max_workers: usize,
    /// Default per-image size budget when the request does not carry one.
    pub default_target_size_bytes: usize,
    /// Wall-clock deadline over an entire batch.
    pub batch_deadline_secs: u64,
    /// Request body limit for the multipart upload.
    pub max_file_size_bytes: usize,
    /// Root directory for optimized/thumbnail output files.
    pub storage_path: String,
    /// Base URL prepended to stored file keys. Empty means relative URLs.
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let default_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            max_workers: env::var("MAX_WORKERS")
                .unwrap_or_else(|_| default_workers.to_string())
                .parse()
                .map(|n: usize| n.max(1))
                .unwrap_or(default_workers),
            default_target_size_bytes: env::var("DEFAULT_TARGET_SIZE_BYTES")
                .unwrap_or_else(|_| DEFAULT_TARGET_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_TARGET_SIZE_BYTES),
            batch_deadline_secs: env::var("BATCH_DEADLINE_SECS")
                .unwrap_or_else(|_| BATCH_DEADLINE_SECS.to_string())
                .parse()
                .unwrap_or(BATCH_DEADLINE_SECS),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "./data".to_string()),
            base_url: env::var("BASE_URL").unwrap_or_default(),
        })
    }

    pub fn batch_deadline(&self) -> Duration {
        Duration::from_secs(self.batch_deadline_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_deadline_duration() {
        let config = Config {
            server_port: 3000,
            max_workers: 4,
            default_target_size_bytes: 102_400,
            batch_deadline_secs: 60,
            max_file_size_bytes: 50 * 1024 * 1024,
            storage_path: "./data".to_string(),
            base_url: String::new(),
        };

        assert_eq!(config.batch_deadline(), Duration::from_secs(60));
    }
}
