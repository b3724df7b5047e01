//! Slice definition files (`slices/<package>.yaml`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::ChiselError;

/// The parts of a chisel slice the installer needs.
///
/// `name` is the full `<package>_<slice>` identifier; `essential` already
/// includes the package-wide essentials of the definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub name: String,
    pub package: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub essential: Vec<String>,
}

impl Slice {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            essential: Vec::new(),
        }
    }

    pub fn with_essential<I, S>(mut self, essential: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.essential = essential.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SliceDefinition {
    #[serde(default)]
    package: String,
    #[serde(default)]
    essential: Vec<String>,
    #[serde(default)]
    slices: BTreeMap<String, Option<SliceEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct SliceEntry {
    #[serde(default)]
    essential: Vec<String>,
}

/// Build the full slice name from a package and a slice.
pub fn slice_name(package: &str, slice: &str) -> String {
    format!("{package}_{slice}")
}

/// Split a full slice name into `(package, slice)`.
///
/// Package names may not contain underscores and neither may slice names, so a
/// valid name has exactly one.
pub fn parse_slice_name(name: &str) -> Result<(&str, &str), ChiselError> {
    match name.split_once('_') {
        Some((package, slice)) if !slice.contains('_') => Ok((package, slice)),
        _ => Err(ChiselError::InvalidSliceName(name.to_string())),
    }
}

/// Parse every slice of a definition file, sorted by name.
pub fn parse_slices(path: impl AsRef<Path>) -> Result<Vec<Slice>, ChiselError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ChiselError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_slices_str(path, &content)
}

pub(crate) fn parse_slices_str(path: &Path, content: &str) -> Result<Vec<Slice>, ChiselError> {
    let definition: SliceDefinition =
        serde_yaml::from_str(content).map_err(|source| ChiselError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

    if definition.package.is_empty() {
        return Err(ChiselError::MissingField {
            path: path.to_path_buf(),
            field: "package",
        });
    }
    if definition.slices.is_empty() {
        return Err(ChiselError::MissingField {
            path: path.to_path_buf(),
            field: "slices",
        });
    }
    validate_essential(path, &format!("package {}", definition.package), &definition.essential)?;

    let mut slices = Vec::with_capacity(definition.slices.len());
    for (name, entry) in definition.slices {
        let entry = entry.unwrap_or_default();
        validate_essential(path, &format!("slice {name}"), &entry.essential)?;

        let mut essential = entry.essential;
        essential.extend(definition.essential.iter().cloned());
        slices.push(Slice {
            name: slice_name(&definition.package, &name),
            package: definition.package.clone(),
            essential,
        });
    }
    slices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(slices)
}

fn validate_essential(path: &Path, scope: &str, essential: &[String]) -> Result<(), ChiselError> {
    for name in essential {
        parse_slice_name(name).map_err(|e| ChiselError::InvalidEssential {
            path: path.to_path_buf(),
            scope: scope.to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}
