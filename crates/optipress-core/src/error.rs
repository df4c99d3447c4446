//! Error types module
//!
//! All failures surface through the `AppError` enum so every component
//! reports errors the same way. HTTP response conversion lives in the API
//! crate.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like deadline expiry
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("The request took too long to process. Please try again with fewer or smaller images.")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Severity used when the error is logged at the HTTP boundary.
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) => LogLevel::Debug,
            AppError::Timeout => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    /// Machine-readable error kind, used as a structured logging field.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::ImageProcessing(_) => "image_processing",
            AppError::Storage(_) => "storage",
            AppError::Timeout => "timeout",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}
