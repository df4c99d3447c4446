//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use optipress_core::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Optimized outputs and thumbnails are served straight off the storage
/// root, matching the URLs the optimize handler hands out.
pub fn build_router(config: &Config, state: Arc<AppState>) -> Router {
    let storage_root = PathBuf::from(&config.storage_path);

    Router::new()
        .route("/optimize", post(handlers::optimize::optimize_images))
        .nest_service(
            "/optimized",
            ServeDir::new(storage_root.join("optimized")),
        )
        .nest_service(
            "/thumbnails",
            ServeDir::new(storage_root.join("thumbnails")),
        )
        .layer(RequestBodyLimitLayer::new(config.max_file_size_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
