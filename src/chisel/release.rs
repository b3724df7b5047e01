//! The release configuration (`chisel.yaml`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::ChiselError;

/// Archive sources of a release.
///
/// `v2-archives` entries are merged into `archives` after parsing, taking
/// precedence on name clashes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub archives: HashMap<String, Archive>,
    #[serde(default, rename = "v2-archives", skip_serializing)]
    v2_archives: HashMap<String, Archive>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Archive {
    #[serde(default)]
    pub suites: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
}

impl ReleaseConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChiselError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ChiselError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &content)
    }

    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ChiselError> {
        let mut config: ReleaseConfig =
            serde_yaml::from_str(content).map_err(|source| ChiselError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;

        let v2 = std::mem::take(&mut config.v2_archives);
        config.archives.extend(v2);

        if config.archives.is_empty() {
            return Err(ChiselError::MissingField {
                path: path.to_path_buf(),
                field: "archives",
            });
        }
        for (name, archive) in &config.archives {
            if archive.suites.is_empty() {
                return Err(ChiselError::IncompleteArchive {
                    path: path.to_path_buf(),
                    archive: name.clone(),
                    field: "suites",
                });
            }
            if archive.components.is_empty() {
                return Err(ChiselError::IncompleteArchive {
                    path: path.to_path_buf(),
                    archive: name.clone(),
                    field: "components",
                });
            }
        }
        Ok(config)
    }

    pub fn archive(&self, path: &Path, name: &str) -> Result<&Archive, ChiselError> {
        self.archives
            .get(name)
            .ok_or_else(|| ChiselError::MissingArchive {
                path: path.to_path_buf(),
                archive: name.to_string(),
            })
    }
}
