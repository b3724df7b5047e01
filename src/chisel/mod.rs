//! # Chisel Release Parsing
//!
//! Reads the parts of a chisel release the installer cares about: slice
//! definition files and the release's `chisel.yaml`.

pub mod release;
pub mod slices;

use std::path::PathBuf;
use thiserror::Error;

pub use release::{Archive, ReleaseConfig};
pub use slices::{parse_slice_name, parse_slices, slice_name, Slice};

#[derive(Debug, Error)]
pub enum ChiselError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid slice name: {0}")]
    InvalidSliceName(String),

    #[error("{path}: missing '{field}' field")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path}: {scope} 'essential': {reason}")]
    InvalidEssential {
        path: PathBuf,
        scope: String,
        reason: String,
    },

    #[error("{path}: no '{archive}' archive")]
    MissingArchive { path: PathBuf, archive: String },

    #[error("{path}: archive {archive} has no '{field}'")]
    IncompleteArchive {
        path: PathBuf,
        archive: String,
        field: &'static str,
    },
}
