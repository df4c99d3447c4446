//! Image codec adapter
//!
//! Wraps the decode/resize/encode primitives behind the `ImageCodec` trait
//! so the optimizer and its tests are independent of the actual pixel
//! stack. The production implementation decodes with the `image` crate and
//! encodes JPEG with mozjpeg.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use optipress_core::models::BoundingBox;
use std::io::Cursor;

/// Codec operation errors. Fatal for the affected image only.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("not a decodable image: {0}")]
    Decode(String),

    #[error("degenerate bounding box: {width}x{height}")]
    DegenerateBoundingBox { width: u32, height: u32 },

    #[error("encode failed: {0}")]
    Encode(String),
}

/// Resize + re-encode primitive.
///
/// Resizing preserves aspect ratio, fits inside the bounding box, and never
/// enlarges beyond the source dimensions. Quality is the usual 1-100 lossy
/// dial. Implementations must be deterministic for identical inputs.
pub trait ImageCodec: Send + Sync {
    fn encode(&self, source: &[u8], bbox: BoundingBox, quality: u8) -> Result<Bytes, CodecError>;
}

/// Production codec: `image` decode, aspect-preserving downscale, mozjpeg
/// progressive encode.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegCodec;

impl JpegCodec {
    pub fn new() -> Self {
        JpegCodec
    }

    fn decode(source: &[u8]) -> Result<DynamicImage, CodecError> {
        let reader = image::ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        reader.decode().map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Target dimensions that fit inside the bounding box without upscaling.
    fn fit_within(width: u32, height: u32, bbox: BoundingBox) -> (u32, u32) {
        if width <= bbox.width && height <= bbox.height {
            return (width, height);
        }

        let scale = (bbox.width as f32 / width as f32).min(bbox.height as f32 / height as f32);
        let new_width = ((width as f32 * scale).round() as u32).max(1);
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        (new_width, new_height)
    }

    /// Select resampling filter based on downscale ratio. Heavy downscales
    /// get cheaper filters.
    fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        comp.finish().map_err(|e| CodecError::Encode(e.to_string()))
    }
}

impl ImageCodec for JpegCodec {
    fn encode(&self, source: &[u8], bbox: BoundingBox, quality: u8) -> Result<Bytes, CodecError> {
        if bbox.width == 0 || bbox.height == 0 {
            return Err(CodecError::DegenerateBoundingBox {
                width: bbox.width,
                height: bbox.height,
            });
        }

        let img = Self::decode(source)?;
        let (orig_width, orig_height) = img.dimensions();
        let (new_width, new_height) = Self::fit_within(orig_width, orig_height, bbox);

        let img = if (new_width, new_height) != (orig_width, orig_height) {
            let filter = Self::select_filter(orig_width, orig_height, new_width, new_height);
            img.resize_exact(new_width, new_height, filter)
        } else {
            img
        };

        let encoded = Self::encode_jpeg(&img, quality)?;
        tracing::debug!(
            orig_width,
            orig_height,
            new_width,
            new_height,
            quality,
            output_bytes = encoded.len(),
            "Encoded image"
        );

        Ok(Bytes::from(encoded))
    }
}
