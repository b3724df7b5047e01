//! Partitioning of slice names into install tasks.

use crate::chisel::Slice;

/// Group slice names for installation.
///
/// With `combine`, every name goes into a single group (none for an empty
/// input); otherwise each slice gets its own group. Order follows the input.
pub fn group(slices: &[Slice], combine: bool) -> Vec<Vec<String>> {
    if combine {
        if slices.is_empty() {
            return Vec::new();
        }
        vec![slices.iter().map(|s| s.name.clone()).collect()]
    } else {
        slices.iter().map(|s| vec![s.name.clone()]).collect()
    }
}
