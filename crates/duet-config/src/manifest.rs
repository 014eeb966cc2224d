//! Build manifest shared between the build and the render side.
//!
//! The build writes it next to the server bundle; the server process reads it
//! once at startup to learn the client asset names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const MANIFEST_FILE_NAME: &str = "duet-manifest.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub public_path: String,
    pub client: ClientAssets,
    /// Server entry file name, e.g. `server.bundle.js`
    pub server_entry: String,
    /// Specifiers the server bundle leaves to the runtime, sorted
    #[serde(default)]
    pub externals: Vec<String>,
    /// Emitted binary asset names relative to the client output dir, sorted
    #[serde(default)]
    pub assets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAssets {
    pub script: String,
    #[serde(default)]
    pub stylesheet: Option<String>,
}

impl BuildManifest {
    pub fn script_url(&self) -> String {
        format!("{}{}", self.public_path, self.client.script)
    }

    pub fn stylesheet_url(&self) -> Option<String> {
        self.client
            .stylesheet
            .as_ref()
            .map(|sheet| format!("{}{}", self.public_path, sheet))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io(e)
            }
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            field: MANIFEST_FILE_NAME.to_string(),
            hint: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: MANIFEST_FILE_NAME.to_string(),
            hint: e.to_string(),
        })
    }
}
