//! Optipress Storage Library
//!
//! Storage abstraction for optimized outputs. Backends take a key and a
//! byte buffer and return the URL the file is served under. Keys use the
//! layout `optimized/{filename}` and `thumbnails/{filename}`; keys must
//! not contain `..` or a leading `/`.

pub mod local;
pub mod traits;

pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
