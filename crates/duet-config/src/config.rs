//! Top-level configuration for duet.
//!
//! This module provides the `DuetConfig` struct that groups the build,
//! render and global sections. For file discovery and layered loading, see
//! the `discovery` module.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::build::BuildConfig;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::render::RenderSettings;
use crate::settings::GlobalSettings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuetConfig {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub settings: GlobalSettings,
}

impl DuetConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use duet_config::{DuetConfig, Environment};
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "environment": "production",
    ///     "build": { "public_path": "/static/" }
    /// });
    ///
    /// let config = DuetConfig::from_value(value).unwrap();
    /// assert_eq!(config.environment, Environment::Production);
    /// assert_eq!(config.build.public_path, "/static/");
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: e.to_string(),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.build.validate()?;
        self.render.validate()?;
        Ok(())
    }
}
