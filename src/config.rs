//! # Installer Configuration
//!
//! Layered configuration for the installer: built-in defaults, then `SDF_*`
//! environment variables, then whatever the command line overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{defaults, ENV_PREFIX};

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("cannot load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl ConfigurationError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Maximum number of concurrent install invocations
    pub workers: usize,
    /// Target package architecture
    pub arch: String,
    /// Archive from `chisel.yaml` whose suites/components drive availability queries
    pub archive: String,
    /// Install tool executable
    pub chisel_binary: String,
    /// Availability query executable
    pub rmadison_binary: String,
    /// Deadline for the batched availability query
    pub query_timeout_seconds: u64,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            workers: defaults::WORKERS,
            arch: defaults::ARCH.to_string(),
            archive: defaults::ARCHIVE.to_string(),
            chisel_binary: defaults::CHISEL_BINARY.to_string(),
            rmadison_binary: defaults::RMADISON_BINARY.to_string(),
            query_timeout_seconds: defaults::QUERY_TIMEOUT_SECONDS,
        }
    }
}

impl InstallerConfig {
    /// Load defaults overridden by `SDF_*` environment variables
    /// (e.g. `SDF_WORKERS=4`, `SDF_CHISEL_BINARY=/opt/chisel`).
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let fallback = Self::default();
        let settings = config::Config::builder()
            .set_default("workers", fallback.workers as u64)?
            .set_default("arch", fallback.arch)?
            .set_default("archive", fallback.archive)?
            .set_default("chisel_binary", fallback.chisel_binary)?
            .set_default("rmadison_binary", fallback.rmadison_binary)?
            .set_default("query_timeout_seconds", fallback.query_timeout_seconds)?
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "workers",
                self.workers,
                "must be greater than zero",
            ));
        }
        if self.query_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "query_timeout_seconds",
                self.query_timeout_seconds,
                "must be greater than zero",
            ));
        }
        for (field, value) in [
            ("arch", &self.arch),
            ("archive", &self.archive),
            ("chisel_binary", &self.chisel_binary),
            ("rmadison_binary", &self.rmadison_binary),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigurationError::MissingField(field.to_string()));
            }
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_seconds)
    }
}
