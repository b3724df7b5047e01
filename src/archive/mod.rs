//! # Archive Availability
//!
//! Answers "does this package exist, and for which architectures" before any
//! slice is installed, so runs can fail early on typos or skip packages a
//! target architecture does not carry.
//!
//! ## Architecture
//!
//! - [`rmadison`] - the query collaborator: builds `rmadison(1)` arguments and
//!   parses its pipe-separated rows into [`PackageAvailability`] records
//! - [`availability`] - the filter: one batched query per run, then the
//!   ensure-existence and ignore-missing checks over the shared lookup
//!
//! Both checks run before pruning, since pruning removes slices whose packages
//! must still be seen by the checks.

pub mod availability;
pub mod rmadison;

use std::time::Duration;
use thiserror::Error;

pub use availability::{
    ensure_existence, ignore_missing, query_availability, AvailabilityLookup,
};
pub use rmadison::{ArchiveQuery, PackageAvailability, QueryOptions, RmadisonClient};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot query archives: {0}")]
    Query(String),

    #[error("cannot query archives: {program} failed to start: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot query archives: timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("cannot format output: invalid format: {0}")]
    InvalidRow(String),

    #[error("package {0:?} does not exist")]
    MissingPackage(String),
}
