//! `duet check`: validate without building.
//!
//! Configuration is already validated when it loads. This pass adds the
//! checks that need the filesystem: both entries must resolve and every file
//! under the source root must be matched by a loader rule.

use std::path::{Path, PathBuf};

use duet_bundler::entry::resolve_entry;
use duet_config::{DuetConfig, RuleSet};
use walkdir::{DirEntry, WalkDir};

use crate::error::{CliError, Result};
use crate::ui;

pub fn execute(config: DuetConfig) -> Result<()> {
    ui::success("Configuration is valid");

    let build = &config.build;
    for entry in [&build.client_entry, &build.server_entry] {
        let resolved = resolve_entry(
            &build.source_root,
            &entry.name,
            &entry.path,
            &build.resolve_extensions,
        )?;
        ui::success(&format!("{} → {}", entry.name, resolved.display()));
    }

    let unmatched = find_unmatched(&build.source_root, &build.rules)?;
    if !unmatched.is_empty() {
        for path in &unmatched {
            ui::error(&format!("No loader rule matches {}", path.display()));
        }
        return Err(CliError::UnmatchedFiles(unmatched));
    }

    ui::success(&format!(
        "Every file under {} is handled by a loader rule",
        build.source_root.display()
    ));
    Ok(())
}

/// Files under `source_root` (relative to it, sorted) that no rule selects.
/// Hidden entries and `node_modules` are skipped.
pub fn find_unmatched(source_root: &Path, rules: &RuleSet) -> Result<Vec<PathBuf>> {
    let mut unmatched = Vec::new();

    let walker = WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(e));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if rules.select(entry.path()).is_none() {
            let relative = entry
                .path()
                .strip_prefix(source_root)
                .unwrap_or(entry.path())
                .to_path_buf();
            unmatched.push(relative);
        }
    }

    Ok(unmatched)
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}
