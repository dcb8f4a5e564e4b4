//! Error types for lowlight-filter
//!
//! LUT construction has no failure path for valid parameters, so most
//! variants describe rejected configuration, malformed LUT files, or
//! input buffers that do not describe a W×H×3 raster.

use thiserror::Error;

/// Errors that can occur in the brightening pipeline
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] lowlight_core::Error),

    /// Invalid kernel
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Input buffer is empty or its shape does not match its dimensions
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed LUT file; the whole load is rejected
    #[error("LUT format error at line {line}: {reason}")]
    Format {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// I/O error while reading or writing a LUT file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
