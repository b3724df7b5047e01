//! Single entry point for a slice installation run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{
    CancellationSignal, ChiselCutInstaller, InstallPlan, PlanOptions, SliceInstaller, WorkerPool,
    WorkerPoolConfig,
};
use crate::archive::{
    ensure_existence, ignore_missing, query_availability, ArchiveQuery, RmadisonClient,
};
use crate::chisel::{ReleaseConfig, Slice};
use crate::config::{ConfigurationError, InstallerConfig};
use crate::constants::{defaults, RELEASE_CONFIG_FILE};
use crate::error::Result;

/// Everything that shapes one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Chisel release directory, passed to the install tool and read for
    /// `chisel.yaml` when availability checks are on
    pub release: PathBuf,
    pub arch: String,
    pub workers: usize,
    /// Install every (remaining) slice in one task
    pub combine: bool,
    /// Install only top-level slices
    pub prune: bool,
    pub continue_on_error: bool,
    /// Drop slices whose package is not available for `arch`
    pub ignore_missing: bool,
    /// Fail unless every slice's package exists in the archive
    pub ensure_existence: bool,
    /// Archive of `chisel.yaml` used for availability checks
    pub archive: String,
    pub query_timeout: Duration,
}

impl InstallOptions {
    pub fn new(release: impl Into<PathBuf>) -> Self {
        Self {
            release: release.into(),
            arch: defaults::ARCH.to_string(),
            workers: defaults::WORKERS,
            combine: false,
            prune: false,
            continue_on_error: false,
            ignore_missing: false,
            ensure_existence: false,
            archive: defaults::ARCHIVE.to_string(),
            query_timeout: defaults::QUERY_TIMEOUT,
        }
    }

    /// Options seeded from loaded configuration; run flags start off.
    pub fn from_config(config: &InstallerConfig, release: impl Into<PathBuf>) -> Self {
        Self {
            arch: config.arch.clone(),
            workers: config.workers,
            archive: config.archive.clone(),
            query_timeout: config.query_timeout(),
            ..Self::new(release)
        }
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            prune: self.prune,
            combine: self.combine,
        }
    }

    /// Install tool arguments shared by every task.
    pub fn task_args(&self) -> Vec<String> {
        vec![
            "cut".to_string(),
            "--release".to_string(),
            self.release.display().to_string(),
            "--arch".to_string(),
            self.arch.clone(),
        ]
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "--workers",
                self.workers,
                "must be greater than zero",
            ));
        }
        if self.arch.trim().is_empty() {
            return Err(ConfigurationError::MissingField("arch".to_string()));
        }
        Ok(())
    }
}

/// Wires availability checks, planning and the worker pool together.
#[derive(Clone)]
pub struct SliceOrchestrator {
    installer: Arc<dyn SliceInstaller>,
    archive_query: Arc<dyn ArchiveQuery>,
    cancellation: CancellationSignal,
}

impl SliceOrchestrator {
    pub fn new(installer: Arc<dyn SliceInstaller>, archive_query: Arc<dyn ArchiveQuery>) -> Self {
        Self {
            installer,
            archive_query,
            cancellation: CancellationSignal::new(),
        }
    }

    /// Caller-side signal, e.g. for Ctrl-C. Task failures never set it; once
    /// set, every [`SliceOrchestrator::run`] is cancelled.
    pub fn cancellation(&self) -> CancellationSignal {
        self.cancellation.clone()
    }

    /// `chisel` and `rmadison` executables as configured.
    pub fn from_config(config: &InstallerConfig) -> Self {
        Self::new(
            Arc::new(ChiselCutInstaller::new(config.chisel_binary.clone())),
            Arc::new(RmadisonClient::new(config.rmadison_binary.clone())),
        )
    }

    /// Apply the requested availability checks. Runs before pruning so the
    /// checks see every package of the input.
    pub async fn filter_available(
        &self,
        slices: Vec<Slice>,
        options: &InstallOptions,
    ) -> Result<Vec<Slice>> {
        if !options.ensure_existence && !options.ignore_missing {
            return Ok(slices);
        }

        let path = options.release.join(RELEASE_CONFIG_FILE);
        let release = ReleaseConfig::from_file(&path)?;
        let archive = release.archive(&path, &options.archive)?;
        let lookup = query_availability(
            self.archive_query.as_ref(),
            archive,
            &slices,
            options.query_timeout,
        )
        .await?;

        if options.ensure_existence {
            ensure_existence(&slices, &lookup)?;
        }
        if options.ignore_missing {
            return Ok(ignore_missing(slices, &lookup, &options.arch));
        }
        Ok(slices)
    }

    /// The plan a run would execute, without installing anything.
    pub async fn plan(&self, slices: Vec<Slice>, options: &InstallOptions) -> Result<InstallPlan> {
        options.validate()?;
        let slices = self.filter_available(slices, options).await?;
        Ok(InstallPlan::build(slices, &options.plan_options()))
    }

    /// Check, plan and install. Returns the first failure (fail-fast) or
    /// every failure (continue-on-error).
    pub async fn run(&self, slices: Vec<Slice>, options: &InstallOptions) -> Result<()> {
        let run_id = Uuid::new_v4();
        let span = info_span!("install_run", %run_id, arch = %options.arch);
        async move {
            let pool = WorkerPool::new(
                Arc::clone(&self.installer),
                WorkerPoolConfig {
                    workers: options.workers,
                    continue_on_error: options.continue_on_error,
                },
            )?
            .with_cancellation(self.cancellation.clone());

            let plan = self.plan(slices, options).await?;
            info!(tasks = plan.len(), "Install plan ready");
            let tasks = plan.into_tasks(&options.task_args())?;
            pool.run(tasks).await
        }
        .instrument(span)
        .await
    }
}
