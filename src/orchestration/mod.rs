//! # Orchestration
//!
//! Turns a slice list into install tasks and runs them on a bounded pool of
//! workers.
//!
//! ## Flow
//!
//! ```text
//! slices ─▶ availability checks ─▶ prune ─▶ group ─▶ InstallPlan ─▶ WorkerPool
//! ```
//!
//! - [`pruner`] - keeps only top-level slices (nothing else depends on them)
//! - [`grouper`] - one task per slice, or one task for all of them
//! - [`plan`] - the pruned-and-grouped plan, inspectable before anything runs
//! - [`installer`] - the install tool seam ([`SliceInstaller`]) and its
//!   `chisel cut` implementation
//! - [`worker_pool`] - concurrent execution with fail-fast or
//!   continue-on-error semantics
//! - [`orchestrator`] - the single entry point wiring all of the above

pub mod grouper;
pub mod installer;
pub mod orchestrator;
pub mod plan;
pub mod pruner;
pub mod task;
pub mod worker_pool;

use thiserror::Error;

use crate::constants::CROSS;

pub use grouper::group;
pub use installer::{ChiselCutInstaller, InstallInvocation, SliceInstaller};
pub use orchestrator::{InstallOptions, SliceOrchestrator};
pub use plan::{InstallPlan, PlanOptions};
pub use pruner::prune;
pub use task::InstallTask;
pub use worker_pool::{CancellationSignal, WorkerPool, WorkerPoolConfig};

/// Failure of a single install task.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{} Failed to install {slices}: {status}", CROSS)]
    Failed {
        slices: String,
        status: String,
        /// Combined stdout and stderr of the install tool
        output: String,
    },

    #[error("{} Failed to install {slices}: cannot run {program}: {source}", CROSS)]
    Spawn {
        slices: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create temporary directory: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("install worker panicked: {0}")]
    WorkerPanicked(String),
}

impl InstallError {
    /// Names of the slices the failed task covered, when it was a task failure.
    pub fn slices(&self) -> Option<&str> {
        match self {
            Self::Failed { slices, .. } | Self::Spawn { slices, .. } => Some(slices),
            Self::Workspace(_) | Self::WorkerPanicked(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("install task has no slices")]
    EmptyTask,

    #[error("cannot queue install task: {0}")]
    Queue(String),

    #[error("installation cancelled")]
    Cancelled,
}
