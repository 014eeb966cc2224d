//! # duet-bundler
//!
//! Builds an isomorphic application twice from one source tree: a browser
//! bundle (self-contained IIFE, stylesheet and static assets) and a server
//! bundle (CommonJS, packages left to the runtime). Both targets share one
//! loader rule set so CSS module class names agree between them.
//!
//! ```no_run
//! use duet_bundler::{BuildContext, BuildDefinition, build_all};
//! use duet_config::ConfigLoader;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new(".").load()?;
//! let definition = BuildDefinition::from_config(&config.build);
//! let output = build_all(&definition, &BuildContext::from_config(&config.build)).await?;
//! output.write()?;
//! # Ok(()) }
//! ```

use std::path::PathBuf;

use rolldown_error::BatchedBuildDiagnostic;

pub mod build;
pub mod entry;
pub mod external;
pub mod optimize;
pub mod plugin;
pub mod stylesheet;
pub mod target;
pub mod writer;

pub use build::{
    Artifact, ArtifactKind, BuildContext, DualBuildOutput, ExternalizationReport, TargetOutput,
    build_all, build_target,
};
pub use external::{ExternalPolicy, ExternalReason, ModuleDisposition, package_name};
pub use optimize::ProductionOptimizations;
pub use plugin::{LoaderPlugin, LoaderState};
pub use target::{
    BuildDefinition, ExportConditions, LibraryForm, RuntimeEnvironment, TargetDescriptor,
};

// Re-export the Rolldown types that appear in our public signatures
pub use rolldown::{BundlerOptions, OutputFormat, Platform};

/// Error types for duet-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A module reached the loader with no matching rule.
    #[error("No loader rule matches '{}'", .path.display())]
    UnmatchedFileType { path: PathBuf },

    /// An entry point could not be found on disk.
    #[error("Entry '{bundle}' could not be resolved from '{}'", .path.display())]
    UnresolvedEntry { bundle: String, path: PathBuf },

    /// A stylesheet failed to compile.
    #[error("Stylesheet '{}' failed to compile: {message}", .path.display())]
    Stylesheet { path: PathBuf, message: String },

    /// Error from Rolldown bundler.
    #[error("Rolldown bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<String>),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] duet_config::ConfigError),
}

/// Result type alias for duet-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Convert a Rolldown error batch into an `Error`.
    pub fn from_rolldown_batch(batch: &BatchedBuildDiagnostic) -> Self {
        Error::Bundler(diagnostic_messages(batch))
    }

    /// Whether the error was raised by the loader for an unmatched file.
    pub fn is_unmatched_file(&self) -> bool {
        matches!(self, Error::UnmatchedFileType { .. })
    }
}

/// One message per diagnostic in the batch, with its event kind as prefix.
fn diagnostic_messages(batch: &BatchedBuildDiagnostic) -> Vec<String> {
    batch
        .iter()
        .map(|diagnostic| format!("[{}] {}", diagnostic.kind(), diagnostic))
        .collect()
}

fn format_bundler_error(messages: &[String]) -> String {
    match messages {
        [] => "Unknown bundler error".to_string(),
        [single] => single.clone(),
        many => format!("{} errors: {}", many.len(), many.join("; ")),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::UnmatchedFileType { .. } => "UNMATCHED_FILE_TYPE",
            Error::UnresolvedEntry { .. } => "UNRESOLVED_ENTRY",
            Error::Stylesheet { .. } => "STYLESHEET_ERROR",
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Io(_) | Error::IoError { .. } => "IO_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::UnmatchedFileType { path } => Some(Box::new(format!(
                "Add a loader rule whose extensions include '{}', or stop importing the file.",
                path.extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default()
            ))),
            Error::UnresolvedEntry { bundle, .. } => Some(Box::new(format!(
                "Check the entry for '{bundle}' under [build] in duet.toml."
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it's within the output directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::Bundler(messages) if messages.len() > 1 => Some(Box::new(
                "Multiple bundler errors occurred. See details above.".to_string(),
            )),
            _ => None,
        }
    }
}
