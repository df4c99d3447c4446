//! Domain models and API response types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Maximum width/height a resize may produce, preserving aspect ratio and
/// never upscaling beyond the source dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(width: u32, height: u32) -> Self {
        BoundingBox { width, height }
    }
}

/// One uploaded file, owned by a single optimizer invocation.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_name: String,
    pub data: Bytes,
}

impl UploadedImage {
    pub fn new(original_name: impl Into<String>, data: Bytes) -> Self {
        UploadedImage {
            original_name: original_name.into(),
            data,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Size budget and encoding parameters shared by every image in a batch.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationTarget {
    /// Byte budget for the main output.
    pub max_bytes: usize,
    /// Bounding box for the main output.
    pub main_bounding_box: BoundingBox,
    /// Bounding box for the thumbnail variant.
    pub thumbnail_bounding_box: BoundingBox,
    /// Fixed quality for the thumbnail (single pass, no convergence).
    pub thumbnail_quality: u8,
    /// Quality the convergence loop starts from.
    pub initial_quality: u8,
    /// Quality decrement applied after each encode attempt.
    pub quality_step: u8,
    /// Exclusive lower bound for the loop condition. With the default step
    /// the last attempted quality is 15.
    pub quality_floor: u8,
}

impl OptimizationTarget {
    pub const DEFAULT_MAX_BYTES: usize = 100 * 1024;

    pub fn with_max_bytes(max_bytes: usize) -> Self {
        OptimizationTarget {
            max_bytes,
            ..Default::default()
        }
    }
}

impl Default for OptimizationTarget {
    fn default() -> Self {
        OptimizationTarget {
            max_bytes: Self::DEFAULT_MAX_BYTES,
            main_bounding_box: BoundingBox::new(1920, 1080),
            thumbnail_bounding_box: BoundingBox::new(350, 350),
            thumbnail_quality: 20,
            initial_quality: 80,
            quality_step: 5,
            quality_floor: 10,
        }
    }
}

/// The ordered unit of work for one request.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub images: Vec<UploadedImage>,
    pub target: OptimizationTarget,
}

impl BatchJob {
    pub fn new(images: Vec<UploadedImage>, target: OptimizationTarget) -> Self {
        BatchJob { images, target }
    }
}

/// Outcome of optimizing a single image. Buffers are handed to storage by
/// the caller; the core never keeps them.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub original_name: String,
    pub optimized: Bytes,
    pub thumbnail: Bytes,
    pub original_size: usize,
    pub optimized_size: usize,
    pub thumbnail_size: usize,
    /// optimized_size / original_size * 100, rounded to 2 decimal places.
    pub compression_ratio: f64,
    /// Per-image wall-clock seconds.
    pub processing_time: f64,
}

/// Per-image entry in the HTTP response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedImageResponse {
    pub original_name: String,
    pub optimized_url: String,
    pub thumbnail_url: String,
    pub original_size: usize,
    pub optimized_size: usize,
    pub thumbnail_size: usize,
    /// Two-decimal string, e.g. "42.17".
    pub compression_ratio: String,
    /// Two-decimal string of seconds.
    pub processing_time: String,
}

/// Aggregate HTTP response for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub message: String,
    pub results: Vec<OptimizedImageResponse>,
    /// End-to-end wall-clock seconds across the whole batch, two decimals.
    pub total_processing_time: String,
}
