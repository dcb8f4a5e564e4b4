//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// Failed to write an image
    #[error("failed to write image '{path}': {message}")]
    ImageWrite { path: String, message: String },

    /// Failed to build a synthetic fixture
    #[error("failed to build fixture '{name}': {message}")]
    Fixture { name: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
