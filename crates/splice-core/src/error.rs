//! Error types for Splice.
//!
//! [`SpliceError`] is shared by the pipeline, the chained-handler convention
//! and the adapter. The adapter itself only ever originates
//! [`SpliceError::ContinuationReused`]; everything else is produced by writers,
//! stages or middlewares and travels through Splice unmodified.

use thiserror::Error;

/// Result type alias using [`SpliceError`].
pub type SpliceResult<T> = Result<T, SpliceError>;

/// Standard error type for Splice.
///
/// # Example
///
/// ```
/// use splice_core::{SpliceError, SpliceResult};
///
/// fn check_token(token: Option<&str>) -> SpliceResult<()> {
///     match token {
///         Some(_) => Ok(()),
///         None => Err(SpliceError::handler("missing token")),
///     }
/// }
///
/// assert!(check_token(None).is_err());
/// ```
#[derive(Error, Debug)]
pub enum SpliceError {
    /// A response writer failed (short write, closed sink, ...).
    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),

    /// A header value could not be constructed.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// A stage, handler or middleware failed.
    #[error("Handler error: {message}")]
    Handler {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The continuation of a wrapped middleware was invoked more than once
    /// for the same request.
    #[error("Continuation invoked more than once for the same request")]
    ContinuationReused,
}

impl SpliceError {
    /// Creates a handler error with a message.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error with a source error.
    pub fn handler_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Handler {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns true if this error came from a response writer.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_handler_error() {
        let err = SpliceError::handler("boom");
        assert_eq!(err.to_string(), "Handler error: boom");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_handler_error_with_source() {
        let io = std::io::Error::other("disk on fire");
        let err = SpliceError::handler_with_source("render failed", io);
        assert_eq!(err.to_string(), "Handler error: render failed");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: SpliceError = io.into();
        assert!(err.is_io());
        assert_eq!(err.to_string(), "Write error: closed");
    }

    #[test]
    fn test_continuation_reused_display() {
        let err = SpliceError::ContinuationReused;
        assert!(!err.is_io());
        assert!(err.to_string().contains("more than once"));
    }
}
