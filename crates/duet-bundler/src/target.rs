//! Build target types.
//!
//! This module defines the core types for the two build targets:
//! - `RuntimeEnvironment`: Where the artifact will execute
//! - `ExportConditions`: Module resolution conditions per runtime
//! - `LibraryForm`: How the artifact exposes its entry module
//! - `TargetDescriptor`: Everything one target build needs, fixed up front
//! - `BuildDefinition`: The client/server pair built from one config

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use duet_config::BuildConfig;
use rolldown::{OutputFormat, Platform};

use crate::external::ExternalPolicy;

/// Environment where the artifact will execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeEnvironment {
    /// Browser: everything is bundled, stylesheets and assets are emitted
    Browser,
    /// Server runtime (Node.js): platform built-ins and packages stay external
    Server,
}

impl RuntimeEnvironment {
    pub fn platform(self) -> Platform {
        match self {
            Self::Browser => Platform::Browser,
            Self::Server => Platform::Node,
        }
    }

    pub fn conditions(self) -> ExportConditions {
        match self {
            Self::Browser => ExportConditions::Browser,
            Self::Server => ExportConditions::Node,
        }
    }

    /// Whether this target writes stylesheet and binary asset files.
    pub fn emits_static_assets(self) -> bool {
        matches!(self, Self::Browser)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Browser => "client",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Export conditions for module resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportConditions {
    /// Node.js runtime conditions: `["node", "require", "default"]`
    Node,
    /// Browser runtime conditions: `["browser", "import", "module", "default"]`
    Browser,
}

impl ExportConditions {
    /// Get the condition names as a static slice (zero allocation)
    pub fn as_slice(&self) -> &'static [&'static str] {
        match self {
            Self::Node => &["node", "require", "default"],
            Self::Browser => &["browser", "import", "module", "default"],
        }
    }

    /// Convert to a Vec<String> for Rolldown compatibility
    pub fn to_vec(&self) -> Vec<String> {
        self.as_slice().iter().map(|s| (*s).to_string()).collect()
    }

    /// Package.json fields consulted, in order
    pub fn main_fields(&self) -> Vec<String> {
        let fields: &[&str] = match self {
            Self::Node => &["main", "module"],
            Self::Browser => &["browser", "module", "main"],
        };
        fields.iter().map(|s| (*s).to_string()).collect()
    }
}

/// How an artifact exposes its entry module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryForm {
    /// Self-executing script with no exports surface
    None,
    /// CommonJS where a lone default export becomes `module.exports`
    CommonJsInterop,
}

impl LibraryForm {
    pub fn output_format(self) -> OutputFormat {
        match self {
            Self::None => OutputFormat::Iife,
            Self::CommonJsInterop => OutputFormat::Cjs,
        }
    }
}

/// Immutable description of one target build.
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    pub runtime: RuntimeEnvironment,
    /// Bundle name → entry path relative to the source root
    pub entry_points: BTreeMap<String, PathBuf>,
    pub external_policy: ExternalPolicy,
    pub library_form: LibraryForm,
    pub output_dir: PathBuf,
}

impl TargetDescriptor {
    /// Browser target: one entry, everything inlined, self-executing script.
    pub fn client(config: &BuildConfig) -> Self {
        Self {
            runtime: RuntimeEnvironment::Browser,
            entry_points: BTreeMap::from([(
                config.client_entry.name.clone(),
                config.client_entry.path.clone(),
            )]),
            external_policy: ExternalPolicy::BundleAll,
            library_form: LibraryForm::None,
            output_dir: config.client_output_dir.clone(),
        }
    }

    /// Server target: packages external, CommonJS with interop.
    pub fn server(config: &BuildConfig) -> Self {
        Self {
            runtime: RuntimeEnvironment::Server,
            entry_points: BTreeMap::from([(
                config.server_entry.name.clone(),
                config.server_entry.path.clone(),
            )]),
            external_policy: ExternalPolicy::externalize_packages(
                config.external_allow_list.iter().cloned(),
            ),
            library_form: LibraryForm::CommonJsInterop,
            output_dir: config.server_output_dir.clone(),
        }
    }
}

/// The pair of targets a build produces.
#[derive(Debug, Clone)]
pub struct BuildDefinition {
    pub client: TargetDescriptor,
    pub server: TargetDescriptor,
}

impl BuildDefinition {
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            client: TargetDescriptor::client(config),
            server: TargetDescriptor::server(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_follow_config() {
        let config = BuildConfig::default();
        let definition = BuildDefinition::from_config(&config);

        assert_eq!(definition.client.runtime, RuntimeEnvironment::Browser);
        assert_eq!(
            definition.client.entry_points.get("client.bundle"),
            Some(&PathBuf::from("client"))
        );
        assert_eq!(definition.client.library_form, LibraryForm::None);
        assert!(matches!(definition.client.external_policy, ExternalPolicy::BundleAll));

        assert_eq!(definition.server.runtime, RuntimeEnvironment::Server);
        assert_eq!(definition.server.library_form, LibraryForm::CommonJsInterop);
        assert_eq!(definition.server.output_dir, PathBuf::from("dist/server"));
        assert!(
            definition
                .server
                .external_policy
                .allow_list()
                .any(|s| s == "react-dom/server")
        );
    }

    #[test]
    fn only_browser_emits_static_assets() {
        assert!(RuntimeEnvironment::Browser.emits_static_assets());
        assert!(!RuntimeEnvironment::Server.emits_static_assets());
    }

    #[test]
    fn library_forms_map_to_formats() {
        assert!(matches!(LibraryForm::None.output_format(), OutputFormat::Iife));
        assert!(matches!(
            LibraryForm::CommonJsInterop.output_format(),
            OutputFormat::Cjs
        ));
    }
}
