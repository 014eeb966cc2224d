//! Error handling for the duet CLI.
//!
//! Library errors convert into [`CliError`] via `#[from]`; `main` turns the
//! result into a miette report. Bundler errors keep their diagnostic codes
//! and help text.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] duet_config::ConfigError),

    #[error(transparent)]
    Build(#[from] duet_bundler::Error),

    #[error("{} file(s) under the source root match no loader rule", .0.len())]
    UnmatchedFiles(Vec<PathBuf>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Convert a CLI error into a miette report for display.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Build(build) => miette::Report::new(build),
        CliError::Config(config) => {
            miette::miette!(help = "Run 'duet check' to validate the configuration", "{config}")
        }
        CliError::UnmatchedFiles(paths) => {
            let listing = paths
                .iter()
                .map(|p| format!("  {}", p.display()))
                .collect::<Vec<_>>()
                .join("\n");
            miette::miette!(
                help = "Add a loader rule for these extensions or move the files out of the source root",
                "{} file(s) match no loader rule:\n{}",
                paths.len(),
                listing
            )
        }
        other => miette::miette!("{other}"),
    }
}
