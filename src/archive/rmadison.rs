//! Package availability through `rmadison(1)` (shipped in Ubuntu's
//! `devscripts`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use super::ArchiveError;
use crate::constants::defaults;

/// Filters for an availability query. Empty filters are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub arch: Vec<String>,
    pub component: Vec<String>,
    pub suite: Vec<String>,
    pub package: Vec<String>,
}

/// One result row: package, version, suite(s), arch(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageAvailability {
    pub package: String,
    pub version: String,
    pub suite: String,
    /// Comma-separated architecture tokens, e.g. `source, amd64, i386`.
    pub arch: String,
}

impl PackageAvailability {
    /// Whether the package is built for `arch`, or is architecture-independent.
    pub fn supports_arch(&self, arch: &str) -> bool {
        self.arch
            .split(',')
            .map(str::trim)
            .any(|token| token == arch || token == crate::constants::ARCH_ALL)
    }
}

/// Source of package availability rows.
#[async_trait]
pub trait ArchiveQuery: Send + Sync {
    async fn query(&self, options: &QueryOptions) -> Result<Vec<PackageAvailability>, ArchiveError>;
}

/// Runs the `rmadison` executable.
#[derive(Debug, Clone)]
pub struct RmadisonClient {
    program: String,
}

impl Default for RmadisonClient {
    fn default() -> Self {
        Self::new(defaults::RMADISON_BINARY)
    }
}

impl RmadisonClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ArchiveQuery for RmadisonClient {
    async fn query(&self, options: &QueryOptions) -> Result<Vec<PackageAvailability>, ArchiveError> {
        info!("Querying the remote archive(s)...");
        let args = cmd_args(options);
        debug!(program = %self.program, ?args, "Running availability query");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ArchiveError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ArchiveError::Query(format!(
                "{} {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Command line arguments for a query.
pub fn cmd_args(options: &QueryOptions) -> Vec<String> {
    let mut args = Vec::new();
    for (flag, values) in [
        ("-a", &options.arch),
        ("-c", &options.component),
        ("-s", &options.suite),
    ] {
        if !values.is_empty() {
            args.push(flag.to_string());
            args.push(values.join(","));
        }
    }
    args.extend(options.package.iter().cloned());
    args
}

/// Parse `rmadison` output. Blank lines are skipped; any other line must have
/// exactly four `|`-separated fields.
pub fn parse_output(output: &str) -> Result<Vec<PackageAvailability>, ArchiveError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_row)
        .collect()
}

fn parse_row(line: &str) -> Result<PackageAvailability, ArchiveError> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [package, version, suite, arch] => Ok(PackageAvailability {
            package: package.to_string(),
            version: version.to_string(),
            suite: suite.to_string(),
            arch: arch.to_string(),
        }),
        _ => Err(ArchiveError::InvalidRow(line.to_string())),
    }
}
