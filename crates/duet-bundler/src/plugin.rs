//! Rolldown plugin applying the external policy and the loader rule set.
//!
//! `resolve_id` decides inline vs external for every specifier. `load` picks
//! the first matching loader rule for every module that gets inlined:
//!
//! ```text
//! script      → read as JSX, bundled by Rolldown
//! stylesheet  → (grass) → lightningcss modules → CSS collected, class map exported
//! file        → copied under its output name, public URL exported
//! no match    → fatal, the offending path is recorded
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use duet_config::{RuleSet, Strategy};
use parking_lot::Mutex;
use rolldown_common::side_effects::HookSideEffects;
use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::external::{ExternalPolicy, ExternalReason, ModuleDisposition};
use crate::optimize::ProductionOptimizations;
use crate::stylesheet::{StylesheetOptions, compile_stylesheet};
use crate::target::RuntimeEnvironment;

/// Stylesheet output of one module.
#[derive(Debug, Clone)]
pub struct CollectedStylesheet {
    pub module_id: String,
    pub css: String,
}

/// Everything the plugin observed during one build.
#[derive(Debug, Default)]
pub struct LoaderState {
    /// External specifier → why it stayed external
    pub externals: BTreeMap<String, ExternalReason>,
    /// Module ids (relative to the source root when inside it) that were bundled
    pub inlined: BTreeSet<String>,
    /// In load order, which varies between runs
    pub stylesheets: Vec<CollectedStylesheet>,
    /// Output name → source file
    pub assets: BTreeMap<String, PathBuf>,
    pub unmatched: Vec<PathBuf>,
    pub stylesheet_failures: Vec<(PathBuf, String)>,
}

impl LoaderState {
    /// Concatenate collected CSS, honouring the dedupe and ordering optimizations.
    ///
    /// `module_order` lists module ids in chunk execution order, which is the
    /// order the source imports them. Sheets missing from it go last, by id.
    pub fn stylesheet_bundle(
        &self,
        optimizations: &ProductionOptimizations,
        module_order: &[String],
    ) -> Option<String> {
        let mut sheets: Vec<&CollectedStylesheet> = self.stylesheets.iter().collect();
        if optimizations.stable_ids {
            let position: HashMap<&str, usize> = module_order
                .iter()
                .enumerate()
                .map(|(index, id)| (id.as_str(), index))
                .collect();
            let rank = |sheet: &CollectedStylesheet| {
                position
                    .get(sheet.module_id.as_str())
                    .copied()
                    .unwrap_or(usize::MAX)
            };
            sheets.sort_by(|a, b| {
                rank(a)
                    .cmp(&rank(b))
                    .then_with(|| a.module_id.cmp(&b.module_id))
            });
        }

        let mut seen = HashSet::new();
        let mut out = String::new();
        for sheet in sheets {
            if optimizations.dedupe_stylesheets && !seen.insert(blake3::hash(sheet.css.as_bytes())) {
                tracing::debug!("Dropping duplicate stylesheet {}", sheet.module_id);
                continue;
            }
            if sheet.css.is_empty() {
                continue;
            }
            out.push_str(&sheet.css);
            if !out.ends_with('\n') && !optimizations.minify {
                out.push('\n');
            }
        }

        (!out.is_empty()).then_some(out)
    }
}

#[derive(Debug)]
pub struct LoaderPlugin {
    runtime: RuntimeEnvironment,
    policy: ExternalPolicy,
    rules: Arc<RuleSet>,
    source_root: PathBuf,
    public_path: String,
    optimizations: ProductionOptimizations,
    state: Arc<Mutex<LoaderState>>,
}

impl LoaderPlugin {
    pub fn new(
        runtime: RuntimeEnvironment,
        policy: ExternalPolicy,
        rules: Arc<RuleSet>,
        source_root: impl Into<PathBuf>,
        public_path: impl Into<String>,
        optimizations: ProductionOptimizations,
    ) -> Self {
        Self {
            runtime,
            policy,
            rules,
            source_root: source_root.into(),
            public_path: public_path.into(),
            optimizations,
            state: Arc::new(Mutex::new(LoaderState::default())),
        }
    }

    pub fn take_state(&self) -> LoaderState {
        std::mem::take(&mut *self.state.lock())
    }
}

/// Module id as reported: relative to `root` when the file lives under it.
pub(crate) fn display_id(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn is_internal_id(id: &str) -> bool {
    id.starts_with('\0') || id.starts_with("rolldown:")
}

impl Plugin for LoaderPlugin {
    fn name(&self) -> Cow<'static, str> {
        "duet-loader".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let disposition = self.policy.classify(&specifier);
        let state = Arc::clone(&self.state);
        let runtime = self.runtime;

        async move {
            match disposition {
                ModuleDisposition::Inline => Ok(None),
                ModuleDisposition::External(reason) => {
                    tracing::trace!("[{}] external: {} ({:?})", runtime, specifier, reason);
                    state.lock().externals.insert(specifier.clone(), reason);
                    Ok(Some(HookResolveIdOutput {
                        id: specifier.into(),
                        external: Some(ResolvedExternal::Bool(true)),
                        ..Default::default()
                    }))
                }
            }
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let rules = Arc::clone(&self.rules);
        let state = Arc::clone(&self.state);
        let source_root = self.source_root.clone();
        let public_path = self.public_path.clone();
        let runtime = self.runtime;
        let minify = self.optimizations.minify;

        async move {
            if is_internal_id(&id) {
                return Ok(None);
            }

            let path = PathBuf::from(&id);
            let module_id = display_id(&source_root, &path);

            let Some(rule) = rules.select(&path) else {
                state.lock().unmatched.push(path.clone());
                return Err(anyhow!("no loader rule matches {}", path.display()));
            };

            tracing::trace!("[{}] {} → rule '{}'", runtime, module_id, rule.name);
            state.lock().inlined.insert(module_id.clone());

            match rule.strategy() {
                Strategy::Script => {
                    let source = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    Ok(Some(HookLoadOutput {
                        code: source.into(),
                        module_type: Some(ModuleType::Jsx),
                        ..Default::default()
                    }))
                }
                Strategy::Stylesheet { sass } => {
                    let source = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    let options = StylesheetOptions {
                        relative_name: &module_id,
                        load_dir: path.parent(),
                        sass,
                        scoped_pattern: rule.scoped_class_pattern(),
                        minify,
                    };

                    let compiled = match compile_stylesheet(&source, &options) {
                        Ok(compiled) => compiled,
                        Err(e) => {
                            let message = e.to_string();
                            state
                                .lock()
                                .stylesheet_failures
                                .push((path.clone(), message.clone()));
                            return Err(anyhow!("{}: {}", path.display(), message));
                        }
                    };

                    let code = compiled.to_module_code();
                    if runtime.emits_static_assets() {
                        state.lock().stylesheets.push(CollectedStylesheet {
                            module_id,
                            css: compiled.css,
                        });
                    }

                    // Side-effect imports (`import './reset.css'`) must stay in the chunk
                    Ok(Some(HookLoadOutput {
                        code: code.into(),
                        module_type: Some(ModuleType::Js),
                        side_effects: Some(HookSideEffects::True),
                        ..Default::default()
                    }))
                }
                Strategy::File => {
                    let output_name = rule.output_naming.render(&path);
                    let url = format!("{public_path}{output_name}");
                    if runtime.emits_static_assets() {
                        state.lock().assets.insert(output_name, path.clone());
                    }

                    let code = format!(
                        "export default {};\n",
                        serde_json::to_string(&url).unwrap_or_else(|_| "\"\"".to_string())
                    );
                    Ok(Some(HookLoadOutput {
                        code: code.into(),
                        module_type: Some(ModuleType::Js),
                        ..Default::default()
                    }))
                }
            }
        }
    }
}
