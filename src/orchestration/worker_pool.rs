//! Bounded Worker Pool for Install Tasks
//!
//! Runs every task of a plan through a [`SliceInstaller`] with at most
//! `workers` installs in flight.
//!
//! ## Protocol
//!
//! 1. All tasks go into a bounded queue which is closed before any worker
//!    starts. Workers only read from it.
//! 2. `min(workers, tasks)` workers start. Each owns one cache directory for
//!    its whole life and takes tasks until the queue is drained or the run is
//!    cancelled.
//! 3. Every task gets a fresh output root, removed after the install whatever
//!    the outcome.
//! 4. Failures go to a report channel sized to the task count, so a send
//!    never waits. Installs interrupted by cancellation are not reported.
//! 5. A supervisor joins the workers. The report channel closes once the
//!    supervisor and every worker have dropped their senders, which is the
//!    completion signal: every report sent before it is seen by the collector.
//! 6. Fail-fast: the first report cancels the run, the remaining workers are
//!    joined (which drops their installs and removes their directories), and
//!    the report is returned as is. Continue-on-error: every report is kept
//!    and returned as one [`AggregateError`].
//!
//! A task failure only cancels the run it belongs to. The pool's
//! [`CancellationSignal`] is reserved for callers, so the pool can run again
//! after a failed run.

use crossbeam::channel::{self, Receiver};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::{InstallError, InstallInvocation, InstallTask, OrchestrationError, SliceInstaller};
use crate::config::ConfigurationError;
use crate::constants::TICK;
use crate::error::{AggregateError, Result};
use crate::logging::{log_error, log_install_operation};

/// Shared, one-shot cancellation signal.
///
/// Cancelling stops workers from taking new tasks and drops any install
/// still in flight, which terminates its process.
///
/// ```rust
/// # tokio_test::block_on(async {
/// use chisel_sdf::orchestration::CancellationSignal;
///
/// let signal = CancellationSignal::new();
/// let handle = signal.clone();
/// assert!(handle.cancel());
/// assert!(!signal.cancel());
/// signal.cancelled().await;
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the run is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only resolves on cancellation.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Maximum number of concurrent installs
    pub workers: usize,
    /// Keep going after a failed task and report every failure at the end
    pub continue_on_error: bool,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: crate::constants::defaults::WORKERS,
            continue_on_error: false,
        }
    }
}

#[derive(Clone)]
pub struct WorkerPool {
    installer: Arc<dyn SliceInstaller>,
    config: WorkerPoolConfig,
    cancellation: CancellationSignal,
}

impl WorkerPool {
    pub fn new(
        installer: Arc<dyn SliceInstaller>,
        config: WorkerPoolConfig,
    ) -> std::result::Result<Self, ConfigurationError> {
        if config.workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "workers",
                config.workers,
                "must be greater than zero",
            ));
        }
        Ok(Self {
            installer,
            config,
            cancellation: CancellationSignal::new(),
        })
    }

    /// Share an existing cancellation signal instead of the pool's own.
    pub fn with_cancellation(mut self, cancellation: CancellationSignal) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Handle for cancelling runs from outside, e.g. on Ctrl-C.
    pub fn cancellation(&self) -> CancellationSignal {
        self.cancellation.clone()
    }

    /// Run all tasks. See the module docs for the failure semantics.
    ///
    /// A run cancelled from outside with no failures returns
    /// [`OrchestrationError::Cancelled`]. The outside signal stays set, so
    /// later runs of this pool are cancelled too.
    pub async fn run(&self, tasks: Vec<InstallTask>) -> Result<()> {
        if tasks.is_empty() {
            info!("{} Nothing to install :)", TICK);
            return Ok(());
        }

        let task_count = tasks.len();
        let (task_tx, task_rx) = channel::bounded(task_count);
        for task in tasks {
            task_tx
                .send(task)
                .map_err(|e| OrchestrationError::Queue(e.to_string()))?;
        }
        drop(task_tx);

        let (report_tx, mut report_rx) = mpsc::channel(task_count);
        let worker_count = self.config.workers.min(task_count);
        let fail_fast = !self.config.continue_on_error;
        info!(
            tasks = task_count,
            workers = worker_count,
            continue_on_error = self.config.continue_on_error,
            "Starting install workers"
        );

        let cancellation = RunCancellation {
            external: self.cancellation.clone(),
            run: CancellationSignal::new(),
        };
        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let worker = Worker {
                id: worker_id,
                installer: Arc::clone(&self.installer),
                tasks: task_rx.clone(),
                reports: report_tx.clone(),
                cancellation: cancellation.clone(),
                fail_fast,
            };
            workers.spawn(worker.run());
        }
        drop(task_rx);

        let supervisor = tokio::spawn(supervise(workers, report_tx));

        let mut failures = Vec::new();
        while let Some(failure) = report_rx.recv().await {
            failures.push(failure);
            if fail_fast {
                if cancellation.run.cancel() {
                    debug!("Cancelled remaining installs after first failure");
                }
                break;
            }
        }
        // Reports after the first fail-fast one are dropped, never waited on.
        drop(report_rx);

        if let Err(e) = supervisor.await {
            warn!("Worker supervisor did not finish cleanly: {}", e);
        }
        if fail_fast {
            if let Some(first) = failures.pop() {
                return Err(first.into());
            }
        }
        if failures.is_empty() && self.cancellation.is_cancelled() {
            return Err(OrchestrationError::Cancelled.into());
        }

        match AggregateError::from_errors(failures) {
            Some(aggregate) => {
                error!(failed = aggregate.len(), tasks = task_count, "Some installs failed");
                Err(aggregate.into())
            }
            None => {
                info!(tasks = task_count, "All installs finished");
                Ok(())
            }
        }
    }
}

/// Joins every worker, turning panics into reports. Dropping `reports` at the
/// end is what lets the collector see completion.
async fn supervise(mut workers: JoinSet<()>, reports: mpsc::Sender<InstallError>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                log_error("worker_pool", "join_worker", &e.to_string(), None);
                let _ = reports
                    .send(InstallError::WorkerPanicked(e.to_string()))
                    .await;
            }
        }
    }
    debug!("All install workers finished");
}

/// What workers watch: the caller's signal and the run's own.
#[derive(Clone)]
struct RunCancellation {
    external: CancellationSignal,
    run: CancellationSignal,
}

impl RunCancellation {
    fn is_cancelled(&self) -> bool {
        self.external.is_cancelled() || self.run.is_cancelled()
    }

    async fn cancelled(&self) {
        tokio::select! {
            _ = self.external.cancelled() => {}
            _ = self.run.cancelled() => {}
        }
    }
}

enum TaskOutcome {
    Installed,
    Failed(InstallError),
    Cancelled,
}

struct Worker {
    id: usize,
    installer: Arc<dyn SliceInstaller>,
    tasks: Receiver<InstallTask>,
    reports: mpsc::Sender<InstallError>,
    cancellation: RunCancellation,
    fail_fast: bool,
}

impl Worker {
    async fn run(self) {
        let cache_dir = match tempfile::Builder::new().prefix("sdf-cache-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                let _ = self.reports.send(InstallError::Workspace(e)).await;
                return;
            }
        };
        debug!(worker_id = self.id, cache = %cache_dir.path().display(), "Worker started");

        loop {
            if self.cancellation.is_cancelled() {
                debug!(worker_id = self.id, "Run cancelled, worker quitting");
                break;
            }
            // The queue was closed before workers started, so an empty queue
            // means there is nothing left to do.
            let Ok(task) = self.tasks.try_recv() else {
                break;
            };

            match self.execute(&task, cache_dir.path()).await {
                TaskOutcome::Installed => {}
                TaskOutcome::Cancelled => {
                    debug!(worker_id = self.id, slices = %task.display_name(), "Install interrupted by cancellation");
                }
                TaskOutcome::Failed(failure) => {
                    if self.fail_fast {
                        self.cancellation.run.cancel();
                    }
                    let _ = self.reports.send(failure).await;
                }
            }
        }

        if let Err(e) = cache_dir.close() {
            warn!(worker_id = self.id, "Cannot remove worker cache: {}", e);
        }
        debug!(worker_id = self.id, "Worker finished");
    }

    async fn execute(&self, task: &InstallTask, cache_dir: &std::path::Path) -> TaskOutcome {
        let name = task.display_name();
        info!("Installing {}...", name);

        let root = match tempfile::Builder::new().prefix("sdf-root-").tempdir() {
            Ok(dir) => dir,
            Err(e) => return TaskOutcome::Failed(InstallError::Workspace(e)),
        };

        let invocation = InstallInvocation {
            task,
            root: root.path(),
            cache_dir,
        };
        let outcome = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => TaskOutcome::Cancelled,
            result = self.installer.install(&invocation) => match result {
                Ok(()) => TaskOutcome::Installed,
                Err(failure) => TaskOutcome::Failed(failure),
            },
        };

        if let Err(e) = root.close() {
            warn!(worker_id = self.id, "Cannot remove output root: {}", e);
        }

        match &outcome {
            TaskOutcome::Installed => {
                info!("{} Installed {}", TICK, name);
                log_install_operation("install", self.id, &name, "installed", None);
            }
            TaskOutcome::Failed(failure) => {
                let output = match failure {
                    InstallError::Failed { output, .. } => Some(output.as_str()),
                    _ => None,
                };
                error!("{}", failure);
                log_install_operation("install", self.id, &name, "failed", output);
            }
            TaskOutcome::Cancelled => {}
        }
        outcome
    }
}
