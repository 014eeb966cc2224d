//! Process-wide environment selection.
//!
//! The environment is read once at startup and handed explicitly to the render
//! middleware, where it picks the asset origin and whether the stylesheet is
//! linked. Bundles are always built with production settings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Production or development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    /// Interpret a `NODE_ENV` value.
    ///
    /// Only the exact value `production` selects production; anything else
    /// (`test`, `staging`, empty) falls back to development.
    pub fn from_node_env(value: &str) -> Self {
        if value.trim() == "production" {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }

    /// The `NODE_ENV` spelling of this environment.
    pub fn node_env(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_env())
    }
}
