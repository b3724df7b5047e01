//! The install tool seam.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::{InstallError, InstallTask};
use crate::constants::{defaults, CACHE_HOME_ENV};

/// Everything one install needs. `root` is a fresh empty directory owned by
/// the task; `cache_dir` is owned by the worker and reused across its tasks.
#[derive(Debug, Clone, Copy)]
pub struct InstallInvocation<'a> {
    pub task: &'a InstallTask,
    pub root: &'a Path,
    pub cache_dir: &'a Path,
}

/// Materializes slices into a root directory.
///
/// Implementations must stop the underlying work when the returned future is
/// dropped; that is how cancellation reaches in-flight installs.
#[async_trait]
pub trait SliceInstaller: Send + Sync {
    async fn install(&self, invocation: &InstallInvocation<'_>) -> Result<(), InstallError>;
}

/// Runs `chisel <args> --root <root> <slices..>` with the worker's cache as
/// `XDG_CACHE_HOME`.
///
/// chisel writes cache entries to `<digest>.tmp` and renames them into place,
/// which breaks when two processes fetch the same digest into one cache. Each
/// worker therefore passes its own cache directory.
#[derive(Debug, Clone)]
pub struct ChiselCutInstaller {
    program: String,
}

impl Default for ChiselCutInstaller {
    fn default() -> Self {
        Self::new(defaults::CHISEL_BINARY)
    }
}

impl ChiselCutInstaller {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl SliceInstaller for ChiselCutInstaller {
    async fn install(&self, invocation: &InstallInvocation<'_>) -> Result<(), InstallError> {
        debug!(
            program = %self.program,
            args = ?invocation.task.args(),
            root = %invocation.root.display(),
            cache = %invocation.cache_dir.display(),
            "Running install tool"
        );

        let output = Command::new(&self.program)
            .args(invocation.task.args())
            .arg("--root")
            .arg(invocation.root)
            .args(invocation.task.slices())
            .env(CACHE_HOME_ENV, invocation.cache_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| InstallError::Spawn {
                slices: invocation.task.display_name(),
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(InstallError::Failed {
            slices: invocation.task.display_name(),
            status: output.status.to_string(),
            output: combined,
        })
    }
}
