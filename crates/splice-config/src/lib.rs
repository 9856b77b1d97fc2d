//! Layered configuration for Splice.
//!
//! A [`SpliceConfig`] holds the [`PipelineConfig`](splice_middleware::PipelineConfig)
//! a pipeline is built with and the [`LogConfig`](splice_telemetry::LogConfig)
//! logging is initialized from. [`ConfigLoader`] assembles it from defaults,
//! a TOML or JSON file and `SPLICE__SECTION__KEY` environment variables, and
//! validates the result.
//!
//! # Example
//!
//! ```
//! use splice_config::ConfigLoader;
//! use splice_middleware::Pipeline;
//!
//! let config = ConfigLoader::new()
//!     .with_str(r#"{"pipeline": {"name": "edge", "trace_stages": true}}"#, "json")
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! let pipeline = Pipeline::builder()
//!     .config(config.pipeline.clone())
//!     .handler(|ctx| ctx.string(http::StatusCode::OK, "ok"))
//!     .build();
//! assert_eq!(pipeline.config().name, "edge");
//! ```

#![doc(html_root_url = "https://docs.rs/splice-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::SpliceConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
