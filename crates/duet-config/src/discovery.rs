//! File-based config discovery and layered loading.
//!
//! Layers, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `duet.toml` or `duet.config.json` (or an explicit file)
//! 3. `NODE_ENV` (mapped onto `environment`)
//! 4. `DUET_*` environment variables, nested keys split on `__`
//!    (`DUET_BUILD__PUBLIC_PATH=/static/`)

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};

use crate::config::DuetConfig;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};

/// Config file names searched in the project root, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["duet.toml", "duet.config.json"];

/// Loads a [`DuetConfig`] for a project root.
///
/// # Example
///
/// ```no_run
/// use duet_config::ConfigLoader;
///
/// let config = ConfigLoader::new(".").load().unwrap();
/// println!("building from {}", config.build.source_root.display());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    config_path: Option<PathBuf>,
    read_env: bool,
}

impl ConfigLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config_path: None,
            read_env: true,
        }
    }

    /// Use this file instead of searching the root. Relative paths resolve against the root.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Skip `NODE_ENV` and `DUET_*` variables.
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a config file in the root directory
    pub fn find(&self) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
    }

    /// Assemble the provider stack without extracting it.
    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(DuetConfig::default()));

        let file = match &self.config_path {
            Some(explicit) => {
                let path = if explicit.is_absolute() {
                    explicit.clone()
                } else {
                    self.root.join(explicit)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => self.find(),
        };

        if let Some(path) = file {
            tracing::debug!("Loading config from {}", path.display());
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(&path)),
                Some("json") => figment.merge(Json::file(&path)),
                other => {
                    return Err(ConfigError::UnsupportedFormat(
                        other.unwrap_or("<none>").to_string(),
                    ));
                }
            };
        }

        if self.read_env {
            if let Ok(node_env) = std::env::var("NODE_ENV") {
                figment = figment.merge(Serialized::default(
                    "environment",
                    Environment::from_node_env(&node_env),
                ));
            }
            figment = figment.merge(Env::prefixed("DUET_").split("__"));
        }

        Ok(figment)
    }

    /// Load, validate and re-root the configuration.
    pub fn load(&self) -> Result<DuetConfig> {
        let mut config: DuetConfig = self.figment()?.extract()?;
        config.validate()?;
        config.build = config.build.rooted_at(&self.root);

        tracing::debug!(
            environment = %config.environment,
            source_root = %config.build.source_root.display(),
            "Configuration loaded"
        );

        Ok(config)
    }
}
