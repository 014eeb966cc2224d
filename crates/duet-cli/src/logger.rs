//! Logging setup for the duet CLI.
//!
//! Filter precedence: `--verbose` (debug), `--quiet` (errors only),
//! `RUST_LOG`, `settings.log_level` from the config file, then info for the
//! duet crates.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "duet=info,duet_bundler=info,duet_config=info,duet_cli=info";
const VERBOSE_FILTER: &str = "duet=debug,duet_bundler=debug,duet_config=debug,duet_cli=debug";

pub fn init_logger(verbose: bool, quiet: bool, no_color: bool, configured: Option<&str>) {
    let filter = build_filter(verbose, quiet, configured);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn build_filter(verbose: bool, quiet: bool, configured: Option<&str>) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            configured
                .and_then(|level| EnvFilter::try_new(level).ok())
                .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
        })
    }
}
