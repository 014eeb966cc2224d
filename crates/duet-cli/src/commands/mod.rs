pub mod build;
pub mod check;

use duet_config::DuetConfig;

use crate::cli::Command;
use crate::error::Result;

/// Run `command` against an already loaded configuration.
pub async fn run(command: Command, config: DuetConfig) -> Result<()> {
    match command {
        Command::Build(_) => build::execute(config).await,
        Command::Check(_) => check::execute(config),
    }
}
