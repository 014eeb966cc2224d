//! Settings for the HTML document the render middleware assembles.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Document `<title>`.
    pub title: String,

    /// Origin serving the client script in development, e.g. `http://localhost:8081`.
    pub dev_asset_origin: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            title: "React Isomorphic Starter Kit".to_string(),
            dev_asset_origin: "http://localhost:8081".to_string(),
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<()> {
        let origin = self.dev_asset_origin.as_str();
        let rest = origin
            .strip_prefix("http://")
            .or_else(|| origin.strip_prefix("https://"));

        match rest {
            Some(host) if !host.is_empty() && !host.ends_with('/') => Ok(()),
            _ => Err(ConfigError::InvalidValue {
                field: "render.dev_asset_origin".to_string(),
                hint: format!(
                    "'{origin}' must be an absolute http(s) origin without a trailing slash"
                ),
            }),
        }
    }
}
