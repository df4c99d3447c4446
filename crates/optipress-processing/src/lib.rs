//! Optipress Processing Library
//!
//! The CPU-bound core of the service:
//! - codec: resize + JPEG re-encode behind the `ImageCodec` trait
//! - optimizer: quality-step convergence toward a byte budget
//! - dispatcher: bounded-concurrency batch execution off the request path

pub mod codec;
pub mod dispatcher;
pub mod optimizer;

// Re-export commonly used types
pub use codec::{CodecError, ImageCodec, JpegCodec};
pub use dispatcher::{BatchError, OptimizerPool};
pub use optimizer::SizeOptimizer;
