//! Global settings that do not belong to a single stage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Default tracing filter when neither flags nor `RUST_LOG` set one.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Build the two targets one after another instead of in parallel.
    #[serde(default)]
    pub sequential: bool,
}
