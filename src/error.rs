//! # Error Types
//!
//! Module-level errors are defined next to the code that raises them and are
//! unified here so callers can propagate everything with `?`.

use std::fmt;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::chisel::ChiselError;
use crate::config::ConfigurationError;
use crate::orchestration::{InstallError, OrchestrationError};

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Chisel(#[from] ChiselError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),

    /// A single task failure, returned under the fail-fast policy.
    #[error(transparent)]
    Install(#[from] InstallError),

    /// Every task failure of a continue-on-error run.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

pub type Result<T> = std::result::Result<T, SdfError>;

/// Failures collected while the remaining tasks kept running.
///
/// Displays one failure per line, in the order they were observed.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<InstallError>,
}

impl AggregateError {
    /// Returns `None` when nothing failed.
    pub fn from_errors(errors: Vec<InstallError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[InstallError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_error_empty_is_none() {
        assert!(AggregateError::from_errors(Vec::new()).is_none());
    }

    #[test]
    fn test_aggregate_error_joins_lines() {
        let errors = vec![
            InstallError::Failed {
                slices: "a_bins".to_string(),
                status: "exit status: 1".to_string(),
                output: String::new(),
            },
            InstallError::Failed {
                slices: "b_libs".to_string(),
                status: "exit status: 2".to_string(),
                output: String::new(),
            },
        ];
        let aggregate = AggregateError::from_errors(errors).unwrap();
        assert_eq!(aggregate.len(), 2);

        let rendered = aggregate.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("a_bins"));
        assert!(lines[1].contains("b_libs"));
    }
}
