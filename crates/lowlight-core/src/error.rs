//! Error types for lowlight-core
//!
//! Provides a unified error type for the buffer and field types in the
//! core crate. Each variant captures enough context for diagnostics
//! without exposing internal implementation details.

use thiserror::Error;

/// lowlight-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Raw buffer length does not match the declared shape
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Null pointer or empty input
    #[error("null or empty input: {0}")]
    NullInput(&'static str),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
