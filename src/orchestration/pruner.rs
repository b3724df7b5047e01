//! Reduction of a slice set to its top-level slices.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::chisel::Slice;

/// Keep only the slices that no other slice in the set lists as essential.
///
/// Installing these alone installs everything else, given chisel's acyclic
/// dependency policy (not checked here). Essential names absent from the set
/// are ignored. Input order is preserved.
pub fn prune(slices: Vec<Slice>) -> Vec<Slice> {
    info!("Pruning the list of slices...");

    let keep: Vec<bool> = {
        let known: HashSet<&str> = slices.iter().map(|s| s.name.as_str()).collect();
        let mut pending = known.clone();
        for slice in &slices {
            for essential in &slice.essential {
                if !known.contains(essential.as_str()) {
                    debug!(
                        slice = %slice.name,
                        essential = %essential,
                        "Essential slice is not part of this run"
                    );
                }
                pending.remove(essential.as_str());
            }
        }
        slices
            .iter()
            .map(|s| pending.contains(s.name.as_str()))
            .collect()
    };

    let before = slices.len();
    let pruned: Vec<Slice> = slices
        .into_iter()
        .zip(keep)
        .filter_map(|(slice, keep)| keep.then_some(slice))
        .collect();
    info!(before, after = pruned.len(), "Pruned slices");
    pruned
}
