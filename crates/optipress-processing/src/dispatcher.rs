//! Batch dispatcher
//!
//! Fans a batch out over a fixed-size worker pool, keeping the CPU-bound
//! encode work off the request-serving tasks. The pool is an explicitly
//! constructed resource: built once at process start, shared across all
//! requests, and injected wherever batches are run.
//!
//! Callers that stop waiting (deadline expiry) simply detach; no
//! cancellation reaches in-flight work. Orphaned optimizations run to
//! completion and release their buffers on normal task exit.

use crate::codec::{CodecError, ImageCodec};
use crate::optimizer::SizeOptimizer;
use optipress_core::models::{BatchJob, OptimizationResult};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to optimize '{name}': {source}")]
    Image {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("optimization task failed: {0}")]
    Join(String),

    #[error("worker pool is shut down")]
    PoolClosed,
}

/// Process-wide bounded worker pool for image optimization.
pub struct OptimizerPool {
    semaphore: Arc<Semaphore>,
    optimizer: Arc<SizeOptimizer>,
}

impl OptimizerPool {
    /// Create a pool allowing at most `max_workers` simultaneous
    /// CPU-bound optimizations across all requests.
    pub fn new(codec: Arc<dyn ImageCodec>, max_workers: usize) -> Self {
        tracing::info!(max_workers, "Optimizer pool initialized");
        OptimizerPool {
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            optimizer: Arc::new(SizeOptimizer::new(codec)),
        }
    }

    /// Run the optimizer once per image, bounded by the pool, and return
    /// results in input order.
    ///
    /// All-or-nothing: the first codec failure fails the whole batch.
    /// Remaining in-flight images are left to finish on their own and
    /// their results are discarded.
    #[tracing::instrument(skip(self, job), fields(batch_size = job.images.len()))]
    pub async fn run_batch(&self, job: BatchJob) -> Result<Vec<OptimizationResult>, BatchError> {
        let BatchJob { images, target } = job;

        let mut handles = Vec::with_capacity(images.len());
        for image in images {
            let semaphore = self.semaphore.clone();
            let optimizer = self.optimizer.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| BatchError::PoolClosed)?;

                let name = image.original_name.clone();
                tokio::task::spawn_blocking(move || optimizer.optimize(&image, &target))
                    .await
                    .map_err(|e| BatchError::Join(e.to_string()))?
                    .map_err(|source| BatchError::Image { name, source })
            }));
        }

        // Join in submission order so output order matches input order.
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle
                .await
                .map_err(|e| BatchError::Join(e.to_string()))??;
            results.push(result);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use optipress_core::models::{BoundingBox, OptimizationTarget, UploadedImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Codec stub: first source byte selects per-image latency, a leading
    /// 0xFF simulates an undecodable image.
    struct StubCodec {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubCodec {
        fn new() -> Self {
            StubCodec {
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl ImageCodec for StubCodec {
        fn encode(&self, source: &[u8], _: BoundingBox, _: u8) -> Result<Bytes, CodecError> {
            if source.first() == Some(&0xFF) {
                return Err(CodecError::Decode("stub: undecodable".to_string()));
            }

            let current = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);

            let delay_ms = source.first().copied().unwrap_or(0) as u64 * 10;
            std::thread::sleep(Duration::from_millis(delay_ms));

            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Bytes::from_static(&[0u8; 16]))
        }
    }

    fn image(name: &str, first_byte: u8, size: usize) -> UploadedImage {
        let mut data = vec![0u8; size];
        data[0] = first_byte;
        UploadedImage::new(name, Bytes::from(data))
    }

    fn oversized_target() -> OptimizationTarget {
        // Every test image exceeds this, so the convergence loop runs.
        OptimizationTarget::with_max_bytes(64)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_result_order_matches_input_order() {
        let pool = OptimizerPool::new(Arc::new(StubCodec::new()), 8);

        // Later images finish first (decreasing latency).
        let images: Vec<UploadedImage> = (0..5)
            .map(|i| image(&format!("img{}.jpg", i), 5 - i as u8, 1024))
            .collect();

        let results = pool
            .run_batch(BatchJob::new(images, oversized_target()))
            .await
            .unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["img0.jpg", "img1.jpg", "img2.jpg", "img3.jpg", "img4.jpg"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_codec_failure_aborts_batch() {
        let pool = OptimizerPool::new(Arc::new(StubCodec::new()), 4);

        let images = vec![
            image("ok.jpg", 1, 1024),
            image("broken.jpg", 0xFF, 1024),
            image("also-ok.jpg", 1, 1024),
        ];

        let err = pool
            .run_batch(BatchJob::new(images, oversized_target()))
            .await
            .unwrap_err();

        match err {
            BatchError::Image { name, .. } => assert_eq!(name, "broken.jpg"),
            other => panic!("expected image failure, got {other}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrency_is_bounded_by_pool_size() {
        let codec = Arc::new(StubCodec::new());
        let pool = OptimizerPool::new(codec.clone(), 2);

        let images: Vec<UploadedImage> = (0..6)
            .map(|i| image(&format!("img{}.jpg", i), 3, 1024))
            .collect();

        pool.run_batch(BatchJob::new(images, oversized_target()))
            .await
            .unwrap();

        assert!(codec.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_empty_batch_yields_empty_results() {
        let pool = OptimizerPool::new(Arc::new(StubCodec::new()), 2);

        let results = pool
            .run_batch(BatchJob::new(Vec::new(), OptimizationTarget::default()))
            .await
            .unwrap();

        assert!(results.is_empty());
    }
}
