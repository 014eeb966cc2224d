//! Command-line interface definition for duet.
//!
//! - `duet build` - build client and server bundles and the manifest
//! - `duet check` - validate configuration, entries and loader coverage

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use duet_config::ConfigLoader;

use crate::error::Result;

/// duet - isomorphic client/server bundler
#[derive(Parser, Debug)]
#[command(
    name = "duet",
    version,
    about = "Build browser and server bundles from one source tree"
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build both targets and write artifacts
    ///
    /// The client and server bundles are built in parallel. The manifest is
    /// written next to the server bundle.
    Build(BuildArgs),

    /// Validate configuration without building
    ///
    /// Verifies that entries resolve and that every file under the source
    /// root is matched by a loader rule.
    Check(CheckArgs),
}

impl Command {
    pub fn project(&self) -> &ProjectArgs {
        match self {
            Command::Build(args) => &args.project,
            Command::Check(args) => &args.project,
        }
    }

    pub fn config_loader(&self) -> Result<ConfigLoader> {
        self.project().config_loader()
    }
}

/// Where the project lives and which config file to use.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Config file (default: duet.toml or duet.config.json in the project root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

impl ProjectArgs {
    pub fn root(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.cwd {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }

    pub fn config_loader(&self) -> Result<ConfigLoader> {
        let root = self.root()?;
        let mut loader = ConfigLoader::new(&root);
        if let Some(config) = &self.config {
            let path = if config.is_absolute() {
                config.clone()
            } else {
                root.join(config)
            };
            loader = loader.config_path(path);
        }
        Ok(loader)
    }
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}
