//! `duet build`: both targets, artifacts, manifest.

use std::time::Instant;

use duet_bundler::{BuildContext, BuildDefinition, TargetOutput, build_all};
use duet_config::DuetConfig;

use crate::error::Result;
use crate::ui;

pub async fn execute(config: DuetConfig) -> Result<()> {
    let start = Instant::now();

    ui::info(&format!(
        "Building client and server bundles from {}",
        config.build.source_root.display()
    ));

    let definition = BuildDefinition::from_config(&config.build);
    let mut ctx = BuildContext::from_config(&config.build);
    if config.settings.sequential {
        ctx = ctx.sequential();
    }

    let output = build_all(&definition, &ctx).await?;
    let written = output.write()?;
    tracing::debug!("wrote {} files", written.len());

    ui::print_build_summary(
        &[
            ("client", summary_rows(&output.client)),
            ("server", summary_rows(&output.server)),
        ],
        start.elapsed(),
    );

    let externals = &output.server.report.externals;
    if !externals.is_empty() {
        ui::info(&format!(
            "Server bundle leaves {} specifier(s) to the runtime: {}",
            externals.len(),
            externals.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    }

    ui::success("Build complete");
    Ok(())
}

fn summary_rows(target: &TargetOutput) -> Vec<(String, u64)> {
    target
        .artifacts
        .iter()
        .map(|a| (a.file_name.clone(), a.contents.len() as u64))
        .collect()
}
