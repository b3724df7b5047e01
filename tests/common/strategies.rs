use chisel_sdf::chisel::Slice;
use proptest::prelude::*;

/// Strategy for generating acyclic slice sets.
///
/// Slice `i` may only list slices with a greater index as essential, plus the
/// odd reference to a slice outside the set.
pub fn acyclic_slices_strategy() -> impl Strategy<Value = Vec<Slice>> {
    (1usize..24).prop_flat_map(|count| {
        prop::collection::vec(
            (prop::collection::vec(any::<prop::sample::Index>(), 0..4), any::<bool>()),
            count,
        )
        .prop_map(move |entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (targets, dangling))| {
                    let mut essential: Vec<String> = targets
                        .into_iter()
                        .filter(|_| i + 1 < count)
                        .map(|t| format!("pkg{}_slice", i + 1 + t.index(count - i - 1)))
                        .collect();
                    if dangling {
                        essential.push(format!("other{i}_slice"));
                    }
                    Slice::new(format!("pkg{i}_slice"), format!("pkg{i}")).with_essential(essential)
                })
                .collect()
        })
    })
}
