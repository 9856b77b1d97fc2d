//! Test error types.

use splice_core::SpliceError;
use thiserror::Error;

/// Errors that can occur during testing.
#[derive(Debug, Error)]
pub enum TestError {
    /// Request building failed.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// Header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Response body could not be read as requested.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// Response body could not be decompressed.
    #[error("Decompression error: {0}")]
    Decompress(#[source] std::io::Error),

    /// The pipeline returned an error.
    #[error("Processing error: {0}")]
    Processing(#[from] SpliceError),
}
