//! The execution plan: pruned, grouped slice names ready to become tasks.

use serde::Serialize;

use super::{group, prune, InstallTask, OrchestrationError};
use crate::chisel::Slice;

/// Shaping options. When both are set, slices are pruned first and the
/// remaining top-level slices are combined into one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    pub prune: bool,
    pub combine: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    groups: Vec<Vec<String>>,
}

impl InstallPlan {
    pub fn build(slices: Vec<Slice>, options: &PlanOptions) -> Self {
        let slices = if options.prune { prune(slices) } else { slices };
        Self {
            groups: group(&slices, options.combine),
        }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One task per group, each starting with `args`.
    pub fn into_tasks(self, args: &[String]) -> Result<Vec<InstallTask>, OrchestrationError> {
        self.groups
            .into_iter()
            .map(|slices| InstallTask::new(args.to_vec(), slices))
            .collect()
    }
}
