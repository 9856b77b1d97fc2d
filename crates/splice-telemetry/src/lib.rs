//! Structured logging for Splice.
//!
//! Splice itself only emits `tracing` events and spans: a `request` span per
//! served request, stage entry and abort events at `debug`, short-circuits of
//! wrapped middleware at `debug` and misuse of a continuation at `warn`. This
//! crate installs a `tracing-subscriber` that turns them into log lines.
//!
//! # Example
//!
//! ```
//! use splice_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     level: "splice=debug,info".to_string(),
//!     format: LogFormat::Compact,
//!     ..LogConfig::default()
//! };
//! config.validate().unwrap();
//!
//! // Fails instead of panicking when a subscriber is already installed.
//! let _ = init_logging(&config);
//! tracing::info!(pipeline = "edge", "logging ready");
//! ```

#![doc(html_root_url = "https://docs.rs/splice-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
