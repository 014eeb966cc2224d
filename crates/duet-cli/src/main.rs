//! duet CLI entry point.

use clap::Parser;
use duet_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Config is loaded before logging so `settings.log_level` can seed the filter
    let loaded = args
        .command
        .config_loader()
        .and_then(|loader| loader.load().map_err(Into::into));
    let configured_level = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.settings.log_level.clone());

    logger::init_logger(
        args.verbose,
        args.quiet,
        args.no_color,
        configured_level.as_deref(),
    );
    ui::init_colors(args.no_color);

    let result = match loaded {
        Ok(config) => commands::run(args.command, config).await,
        Err(e) => Err(e),
    };

    result.map_err(error::cli_error_to_miette)
}
