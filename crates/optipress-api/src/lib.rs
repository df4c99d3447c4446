//! Optipress API Library
//!
//! HTTP surface for the image optimization service: request orchestration,
//! error-to-response mapping, and application setup.

mod handlers;

pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
