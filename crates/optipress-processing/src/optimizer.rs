//! Size-convergence optimizer
//!
//! Drives repeated codec invocations to bring one image under its byte
//! budget, stepping quality down from 80 in steps of 5. Every attempt
//! re-encodes from the original source bytes, never from the previous
//! output, so quality characteristics stay reproducible. The thumbnail is
//! a single fixed-quality pass, independent of the budget.

use crate::codec::{CodecError, ImageCodec};
use optipress_core::models::{OptimizationResult, OptimizationTarget, UploadedImage};
use std::sync::Arc;
use std::time::Instant;

pub struct SizeOptimizer {
    codec: Arc<dyn ImageCodec>,
}

impl SizeOptimizer {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        SizeOptimizer { codec }
    }

    /// Optimize one image toward `target.max_bytes`, best-effort.
    ///
    /// If the source already fits, the "optimized" output is the raw
    /// source bytes, unencoded. If even the lowest attempted quality (15)
    /// does not fit, the oversized result is returned as a fact, not an
    /// error.
    pub fn optimize(
        &self,
        image: &UploadedImage,
        target: &OptimizationTarget,
    ) -> Result<OptimizationResult, CodecError> {
        let start = Instant::now();
        let original_size = image.size_bytes();

        let mut quality = target.initial_quality;
        let mut buffer = image.data.clone();

        while buffer.len() > target.max_bytes && quality > target.quality_floor {
            buffer = self
                .codec
                .encode(&image.data, target.main_bounding_box, quality)?;
            quality -= target.quality_step;
        }

        let thumbnail = self.codec.encode(
            &image.data,
            target.thumbnail_bounding_box,
            target.thumbnail_quality,
        )?;

        let optimized_size = buffer.len();
        let thumbnail_size = thumbnail.len();
        let compression_ratio = round2(optimized_size as f64 / original_size as f64 * 100.0);
        let processing_time = start.elapsed().as_secs_f64();

        tracing::debug!(
            original_name = %image.original_name,
            original_size,
            optimized_size,
            thumbnail_size,
            final_quality = quality,
            target_bytes = target.max_bytes,
            converged = optimized_size <= target.max_bytes,
            "Optimized image"
        );

        Ok(OptimizationResult {
            original_name: image.original_name.clone(),
            optimized: buffer,
            thumbnail,
            original_size,
            optimized_size,
            thumbnail_size,
            compression_ratio,
            processing_time,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
