use serde::Serialize;

use super::OrchestrationError;

/// One install tool invocation: a fixed argument prefix and the slices to
/// install together. The output root is chosen by the worker that runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallTask {
    args: Vec<String>,
    slices: Vec<String>,
}

impl InstallTask {
    pub fn new(args: Vec<String>, slices: Vec<String>) -> Result<Self, OrchestrationError> {
        if slices.is_empty() {
            return Err(OrchestrationError::EmptyTask);
        }
        Ok(Self { args, slices })
    }

    /// Install tool arguments, without the output root or slice names.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn slices(&self) -> &[String] {
        &self.slices
    }

    /// Space-separated slice names, used in logs and errors.
    pub fn display_name(&self) -> String {
        self.slices.join(" ")
    }
}
