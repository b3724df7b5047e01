//! Pre-installation availability checks over a shared package lookup.

use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, warn};

use super::{ArchiveError, ArchiveQuery, PackageAvailability, QueryOptions};
use crate::chisel::{Archive, Slice};

/// Availability rows keyed by package name. A later row for the same package
/// replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityLookup {
    packages: HashMap<String, PackageAvailability>,
}

impl AvailabilityLookup {
    pub fn get(&self, package: &str) -> Option<&PackageAvailability> {
        self.packages.get(package)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<PackageAvailability> for AvailabilityLookup {
    fn from_iter<I: IntoIterator<Item = PackageAvailability>>(iter: I) -> Self {
        Self {
            packages: iter
                .into_iter()
                .map(|row| (row.package.clone(), row))
                .collect(),
        }
    }
}

/// Query the archive once for every distinct package referenced by `slices`.
pub async fn query_availability<Q>(
    query: &Q,
    archive: &Archive,
    slices: &[Slice],
    timeout: Duration,
) -> Result<AvailabilityLookup, ArchiveError>
where
    Q: ArchiveQuery + ?Sized,
{
    let mut seen = HashSet::new();
    let packages: Vec<String> = slices
        .iter()
        .filter(|s| seen.insert(s.package.as_str()))
        .map(|s| s.package.clone())
        .collect();

    let options = QueryOptions {
        arch: Vec::new(),
        component: archive.components.clone(),
        suite: archive.suites.clone(),
        package: packages,
    };

    let rows = tokio::time::timeout(timeout, query.query(&options))
        .await
        .map_err(|_| ArchiveError::Timeout(timeout))??;

    let lookup: AvailabilityLookup = rows.into_iter().collect();
    info!(
        requested = options.package.len(),
        found = lookup.len(),
        "Archive availability fetched"
    );
    Ok(lookup)
}

/// Fail on the first slice, in input order, whose package the archive lacks.
pub fn ensure_existence(slices: &[Slice], lookup: &AvailabilityLookup) -> Result<(), ArchiveError> {
    info!("Ensuring slice packages existence...");
    match slices.iter().find(|s| !lookup.contains(&s.package)) {
        Some(slice) => Err(ArchiveError::MissingPackage(slice.package.clone())),
        None => Ok(()),
    }
}

/// Keep the slices whose package exists for `arch` (or for all architectures).
///
/// The decision is made once per package; input order is preserved.
pub fn ignore_missing(slices: Vec<Slice>, lookup: &AvailabilityLookup, arch: &str) -> Vec<Slice> {
    info!("Ignoring missing slice packages on {}...", arch);
    let mut available: HashMap<String, bool> = HashMap::new();

    slices
        .into_iter()
        .filter(|slice| {
            if let Some(&keep) = available.get(&slice.package) {
                return keep;
            }
            let keep = lookup
                .get(&slice.package)
                .is_some_and(|row| row.supports_arch(arch));
            if !keep {
                warn!("... ignored {} for {}", slice.package, arch);
            }
            available.insert(slice.package.clone(), keep);
            keep
        })
        .collect()
}
