//! Application state.
//!
//! Everything the handlers need, constructed once at process start and
//! injected via `Arc`. The optimizer pool in particular is a process-wide
//! resource shared by all requests; it lives and dies with the state.

use optipress_core::Config;
use optipress_processing::{ImageCodec, JpegCodec, OptimizerPool};
use optipress_storage::{LocalStorage, Storage};
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub pool: OptimizerPool,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    /// Build production state: local storage rooted at the configured
    /// path, JPEG codec, worker pool sized from config.
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let storage = LocalStorage::new(&config.storage_path, config.base_url.clone()).await?;
        let codec: Arc<dyn ImageCodec> = Arc::new(JpegCodec::new());
        let pool = OptimizerPool::new(codec, config.max_workers);

        Ok(AppState {
            config,
            pool,
            storage: Arc::new(storage),
        })
    }

    /// Assemble state from pre-built components. Used by tests to inject
    /// stub codecs or alternative storage.
    pub fn from_parts(config: Config, pool: OptimizerPool, storage: Arc<dyn Storage>) -> Self {
        AppState {
            config,
            pool,
            storage,
        }
    }
}
