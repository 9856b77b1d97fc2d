//! Top-level configuration type.

use serde::{Deserialize, Serialize};
use splice_middleware::PipelineConfig;
use splice_telemetry::LogConfig;

use crate::ConfigError;

/// Complete Splice configuration.
///
/// # Example
///
/// ```
/// use splice_config::SpliceConfig;
///
/// let config = SpliceConfig::default();
/// assert_eq!(config.pipeline.name, "splice");
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SpliceConfig {
    /// Pipeline configuration.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,
}

impl SpliceConfig {
    /// Development preset: human-readable debug logs and per-stage tracing.
    #[must_use]
    pub fn development() -> Self {
        Self {
            pipeline: PipelineConfig {
                trace_stages: true,
                ..PipelineConfig::default()
            },
            logging: LogConfig::development(),
        }
    }

    /// Production preset: JSON logs at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            logging: LogConfig::production(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the pipeline name is empty or
    /// the log level does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.name.trim().is_empty() {
            return Err(ConfigError::validation("pipeline.name must not be empty"));
        }

        self.logging
            .validate()
            .map_err(|e| ConfigError::validation(format!("logging.level: {e}")))
    }
}
