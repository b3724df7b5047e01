//! # System Constants
//!
//! Defaults and fixed values shared by the CLI, configuration and orchestration
//! layers.

use std::time::Duration;

/// Marker printed next to successful installs.
pub const TICK: char = '\u{2713}';

/// Marker printed next to failures.
pub const CROSS: char = '\u{2717}';

/// Architecture token meaning "built for every architecture".
pub const ARCH_ALL: &str = "all";

/// Environment variable the install tool reads its cache root from.
pub const CACHE_HOME_ENV: &str = "XDG_CACHE_HOME";

/// Name of the release configuration file inside a chisel release directory.
pub const RELEASE_CONFIG_FILE: &str = "chisel.yaml";

/// Prefix for environment overrides of [`crate::config::InstallerConfig`].
pub const ENV_PREFIX: &str = "SDF";

pub mod defaults {
    use super::Duration;

    pub const WORKERS: usize = 10;
    pub const ARCH: &str = "amd64";
    pub const ARCHIVE: &str = "ubuntu";
    pub const CHISEL_BINARY: &str = "chisel";
    pub const RMADISON_BINARY: &str = "rmadison";
    pub const QUERY_TIMEOUT_SECONDS: u64 = 20;

    pub const QUERY_TIMEOUT: Duration = Duration::from_secs(QUERY_TIMEOUT_SECONDS);
}
