//! Batch optimization handler - the request orchestrator.
//!
//! Accepts one multipart batch, offloads it to the shared optimizer pool,
//! and races completion against the configured wall-clock deadline. The
//! deadline path detaches rather than cancels: in-flight encodes keep
//! running in the background and their results are discarded.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    Json,
};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;
use optipress_core::models::{
    BatchJob, OptimizationResult, OptimizationTarget, OptimizeResponse, OptimizedImageResponse,
    UploadedImage,
};
use optipress_core::AppError;

/// Optimize a batch of uploaded images.
///
/// Multipart form: repeated `images` file fields plus an optional
/// `targetSize` text field (bytes; non-numeric or zero falls back to the
/// configured default).
#[tracing::instrument(skip(state, multipart), fields(operation = "optimize_batch"))]
pub async fn optimize_images(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OptimizeResponse>, HttpAppError> {
    let start = Instant::now();

    let (images, target_size) =
        extract_batch(multipart, state.config.default_target_size_bytes).await?;

    if images.is_empty() {
        return Err(AppError::InvalidInput("No files uploaded".to_string()).into());
    }

    let file_count = images.len();
    let total_bytes: usize = images.iter().map(|i| i.size_bytes()).sum();
    tracing::info!(file_count, total_bytes, target_size, "Accepted optimization batch");

    let job = BatchJob::new(images, OptimizationTarget::with_max_bytes(target_size));

    // Spawn the batch so deadline expiry detaches from it instead of
    // cancelling it; dropping the JoinHandle leaves the task running.
    let worker = tokio::spawn(process_batch(state.clone(), job));

    let results = match tokio::time::timeout(state.config.batch_deadline(), worker).await {
        Ok(joined) => {
            joined.map_err(|e| AppError::Internal(format!("Batch task failed: {}", e)))??
        }
        Err(_) => {
            tracing::warn!(
                file_count,
                deadline_secs = state.config.batch_deadline_secs,
                "Batch exceeded deadline; detaching from in-flight work"
            );
            return Err(AppError::Timeout.into());
        }
    };

    let total_time = start.elapsed().as_secs_f64();
    tracing::info!(
        file_count,
        total_time_secs = total_time,
        "Batch optimized successfully"
    );

    Ok(Json(OptimizeResponse {
        message: "Images optimized successfully".to_string(),
        results,
        total_processing_time: format!("{:.2}", total_time),
    }))
}

/// Read the uploaded files and target size out of the multipart form.
async fn extract_batch(
    mut multipart: Multipart,
    default_target: usize,
) -> Result<(Vec<UploadedImage>, usize), AppError> {
    let mut images = Vec::new();
    let mut target_size: Option<usize> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "images" => {
                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                images.push(UploadedImage::new(original_name, data));
            }
            "targetSize" => {
                let text = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read targetSize: {}", e))
                })?;
                target_size = text.trim().parse::<usize>().ok().filter(|v| *v > 0);
            }
            _ => {}
        }
    }

    Ok((images, target_size.unwrap_or(default_target)))
}

/// Run the batch on the pool, then persist every output pair and shape the
/// response entries.
async fn process_batch(
    state: Arc<AppState>,
    job: BatchJob,
) -> Result<Vec<OptimizedImageResponse>, AppError> {
    let results = state
        .pool
        .run_batch(job)
        .await
        .map_err(|e| AppError::ImageProcessing(e.to_string()))?;

    let mut entries = Vec::with_capacity(results.len());
    for result in results {
        entries.push(store_result(&state, result).await?);
    }
    Ok(entries)
}

async fn store_result(
    state: &AppState,
    result: OptimizationResult,
) -> Result<OptimizedImageResponse, AppError> {
    let ext = file_extension(&result.original_name);
    let stem = Uuid::new_v4();
    let optimized_key = format!("optimized/{}.{}", stem, ext);
    let thumbnail_key = format!("thumbnails/{}_thumb.{}", stem, ext);

    let optimized_url = state
        .storage
        .store(&optimized_key, result.optimized.to_vec())
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let thumbnail_url = match state
        .storage
        .store(&thumbnail_key, result.thumbnail.to_vec())
        .await
    {
        Ok(url) => url,
        Err(e) => {
            let storage = state.storage.clone();
            tokio::spawn(async move {
                if let Err(cleanup_err) = storage.delete(&optimized_key).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        key = %optimized_key,
                        "Failed to clean up optimized file after storage error"
                    );
                }
            });
            return Err(AppError::Storage(e.to_string()));
        }
    };

    Ok(OptimizedImageResponse {
        original_name: result.original_name,
        optimized_url,
        thumbnail_url,
        original_size: result.original_size,
        optimized_size: result.optimized_size,
        thumbnail_size: result.thumbnail_size,
        compression_ratio: format!("{:.2}", result.compression_ratio),
        processing_time: format!("{:.2}", result.processing_time),
    })
}

/// Lowercased extension of the uploaded filename, defaulting to "jpg".
fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string())
}
