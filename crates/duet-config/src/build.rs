//! Shared build configuration consumed by both targets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::loader::RuleSet;

/// Named entry point: `name` becomes the output file token (`<name>.js`),
/// `path` is relative to the source root and may omit its extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub name: String,
    pub path: PathBuf,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Root of the application source tree, shared by both targets.
    pub source_root: PathBuf,

    pub client_output_dir: PathBuf,

    pub server_output_dir: PathBuf,

    /// URL prefix under which client artifacts are served. Must start and end with `/`.
    pub public_path: String,

    pub client_entry: EntryPoint,

    pub server_entry: EntryPoint,

    /// Compound specifiers the server target always externalizes.
    pub external_allow_list: Vec<String>,

    /// Extensions tried when an import omits one.
    pub resolve_extensions: Vec<String>,

    pub rules: RuleSet,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            client_output_dir: PathBuf::from("dist/client"),
            server_output_dir: PathBuf::from("dist/server"),
            public_path: "/".to_string(),
            client_entry: EntryPoint::new("client.bundle", "client"),
            server_entry: EntryPoint::new("server.bundle", "server"),
            external_allow_list: vec!["react-dom/server".to_string()],
            resolve_extensions: vec![".js".to_string(), ".jsx".to_string()],
            rules: RuleSet::default(),
        }
    }
}

impl BuildConfig {
    /// Re-root every relative directory at `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let anchor = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };
        self.source_root = anchor(self.source_root);
        self.client_output_dir = anchor(self.client_output_dir);
        self.server_output_dir = anchor(self.server_output_dir);
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, entry) in [
            ("build.client_entry", &self.client_entry),
            ("build.server_entry", &self.server_entry),
        ] {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("{field}.name"),
                    hint: "bundle name must not be empty".to_string(),
                });
            }
            if entry.name.contains(['/', '\\']) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{field}.name"),
                    hint: format!("bundle name '{}' must not contain path separators", entry.name),
                });
            }
        }

        if !self.public_path.starts_with('/') || !self.public_path.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "build.public_path".to_string(),
                hint: format!("'{}' must start and end with '/'", self.public_path),
            });
        }

        if self.client_output_dir == self.server_output_dir {
            return Err(ConfigError::InvalidValue {
                field: "build.server_output_dir".to_string(),
                hint: "client and server output directories must differ".to_string(),
            });
        }

        if self.rules.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "build.rules".to_string(),
                hint: "at least one loader rule is required".to_string(),
            });
        }

        Ok(())
    }
}
