#![allow(clippy::doc_markdown)] // Allow technical terms like rmadison, XDG_CACHE_HOME in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # chisel-sdf
//!
//! Concurrent installation of chisel slices for testing slice definitions at
//! scale.
//!
//! ## Overview
//!
//! A chisel release defines hundreds of slices. Checking that each of them
//! installs means running `chisel cut` once per slice (or once for a chosen
//! set) and collecting the failures. This crate plans those runs and executes
//! them on a bounded pool of workers.
//!
//! ## Pipeline
//!
//! 1. **Availability** ([`archive`]) - optionally query the Ubuntu archive once
//!    and fail on unknown packages, or skip packages missing for the target
//!    architecture
//! 2. **Pruning** ([`orchestration::pruner`]) - optionally keep only top-level
//!    slices, since installing a slice installs its essentials
//! 3. **Grouping** ([`orchestration::grouper`]) - one task per slice, or one
//!    task for everything
//! 4. **Execution** ([`orchestration::worker_pool`]) - at most `workers`
//!    installs at a time, each worker with a private chisel cache, failing
//!    fast or collecting every failure
//!
//! ## Module Organization
//!
//! - [`chisel`] - slice definition and `chisel.yaml` parsing
//! - [`archive`] - availability queries and filters
//! - [`orchestration`] - planning and the worker pool
//! - [`config`] - layered installer configuration
//! - [`error`] - structured error handling
//! - [`logging`] - tracing setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chisel_sdf::chisel::parse_slices;
//! use chisel_sdf::config::InstallerConfig;
//! use chisel_sdf::orchestration::{InstallOptions, SliceOrchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InstallerConfig::from_env()?;
//! let slices = parse_slices("release/slices/hello.yaml")?;
//!
//! let mut options = InstallOptions::from_config(&config, "release");
//! options.prune = true;
//! options.continue_on_error = true;
//!
//! SliceOrchestrator::from_config(&config).run(slices, &options).await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod chisel;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod orchestration;

pub use chisel::Slice;
pub use config::InstallerConfig;
pub use error::{AggregateError, Result, SdfError};
pub use orchestration::{InstallOptions, InstallPlan, SliceOrchestrator};
