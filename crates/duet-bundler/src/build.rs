//! Target builds and the parallel dual-target driver.
//!
//! Each target build owns its Rolldown instance and its loader plugin state;
//! the two targets share only immutable inputs (`TargetDescriptor`,
//! `BuildContext`), so they run on separate tasks without coordination.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use duet_config::{BuildConfig, BuildManifest, ClientAssets, MANIFEST_FILE_NAME, RuleSet};
use rolldown::{BundlerBuilder, BundlerOptions, InputItem, ResolveOptions};
use rolldown_common::Output;
use rolldown_plugin::__inner::SharedPluginable;

use crate::entry::resolve_entry;
use crate::external::{ExternalReason, package_name};
use crate::optimize::ProductionOptimizations;
use crate::plugin::{LoaderPlugin, LoaderState, display_id};
use crate::target::{BuildDefinition, RuntimeEnvironment, TargetDescriptor};
use crate::writer::write_artifacts;
use crate::{Error, Result};

/// Immutable inputs shared by both targets.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub source_root: PathBuf,
    pub public_path: String,
    pub rules: Arc<RuleSet>,
    pub resolve_extensions: Vec<String>,
    pub optimizations: ProductionOptimizations,
    /// Build the two targets concurrently
    pub parallel: bool,
}

impl BuildContext {
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            source_root: config.source_root.clone(),
            public_path: config.public_path.clone(),
            rules: Arc::new(config.rules.clone()),
            resolve_extensions: config.resolve_extensions.clone(),
            optimizations: ProductionOptimizations::full(),
            parallel: true,
        }
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Script,
    Stylesheet,
    Asset,
}

/// A named file produced by a target, relative to its output directory.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub kind: ArtifactKind,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// Which specifiers a target kept external and which modules it bundled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalizationReport {
    pub externals: BTreeSet<String>,
    /// Subset of `externals` matched through the allow-list
    pub allow_listed: BTreeSet<String>,
    pub inlined: BTreeSet<String>,
}

impl ExternalizationReport {
    fn from_state(state: &LoaderState) -> Self {
        Self {
            externals: state.externals.keys().cloned().collect(),
            allow_listed: state
                .externals
                .iter()
                .filter(|(_, reason)| **reason == ExternalReason::AllowListed)
                .map(|(spec, _)| spec.clone())
                .collect(),
            inlined: state.inlined.clone(),
        }
    }

    /// Distinct package names behind the external specifiers.
    pub fn packages(&self) -> BTreeSet<&str> {
        self.externals
            .iter()
            .filter_map(|spec| package_name(spec))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TargetOutput {
    pub runtime: RuntimeEnvironment,
    pub output_dir: PathBuf,
    /// Bundle name → entry script file name
    pub entry_files: BTreeMap<String, String>,
    pub stylesheet: Option<String>,
    /// Sorted by file name
    pub artifacts: Vec<Artifact>,
    pub report: ExternalizationReport,
}

impl TargetOutput {
    pub fn artifact(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }

    pub fn entry_code(&self, bundle: &str) -> Option<&str> {
        self.entry_files
            .get(bundle)
            .and_then(|file| self.artifact(file))
            .and_then(Artifact::text)
    }

    pub fn write(&self) -> Result<Vec<PathBuf>> {
        write_artifacts(&self.artifacts, &self.output_dir)
    }
}

#[derive(Debug, Clone)]
pub struct DualBuildOutput {
    pub client: TargetOutput,
    pub server: TargetOutput,
    pub public_path: String,
}

impl DualBuildOutput {
    pub fn manifest(&self) -> BuildManifest {
        let first_entry = |out: &TargetOutput| out.entry_files.values().next().cloned();

        BuildManifest {
            public_path: self.public_path.clone(),
            client: ClientAssets {
                script: first_entry(&self.client).unwrap_or_default(),
                stylesheet: self.client.stylesheet.clone(),
            },
            server_entry: first_entry(&self.server).unwrap_or_default(),
            externals: self.server.report.externals.iter().cloned().collect(),
            assets: self
                .client
                .artifacts
                .iter()
                .filter(|a| a.kind == ArtifactKind::Asset)
                .map(|a| a.file_name.clone())
                .collect(),
        }
    }

    /// Write both targets and the manifest (into the server output directory).
    pub fn write(&self) -> Result<Vec<PathBuf>> {
        let mut written = self.client.write()?;
        written.extend(self.server.write()?);

        let manifest = Artifact {
            file_name: MANIFEST_FILE_NAME.to_string(),
            kind: ArtifactKind::Asset,
            contents: self.manifest().to_json()?.into_bytes(),
        };
        written.extend(write_artifacts(
            std::slice::from_ref(&manifest),
            &self.server.output_dir,
        )?);

        Ok(written)
    }
}

/// Build both targets; either failing fails the build.
pub async fn build_all(definition: &BuildDefinition, ctx: &BuildContext) -> Result<DualBuildOutput> {
    let (client, server) = if ctx.parallel {
        build_parallel(definition, ctx).await?
    } else {
        let client = build_target(&definition.client, ctx).await?;
        let server = build_target(&definition.server, ctx).await?;
        (client, server)
    };

    Ok(DualBuildOutput {
        client,
        server,
        public_path: ctx.public_path.clone(),
    })
}

async fn build_parallel(
    definition: &BuildDefinition,
    ctx: &BuildContext,
) -> Result<(TargetOutput, TargetOutput)> {
    use tokio::task::JoinSet;

    let mut join_set = JoinSet::new();
    for target in [definition.client.clone(), definition.server.clone()] {
        let ctx = ctx.clone();
        join_set.spawn(async move { build_target(&target, &ctx).await });
    }

    let mut client = None;
    let mut server = None;
    while let Some(joined) = join_set.join_next().await {
        let output = joined
            .map_err(|e| Error::Bundler(vec![format!("Build task panicked: {e}")]))??;
        match output.runtime {
            RuntimeEnvironment::Browser => client = Some(output),
            RuntimeEnvironment::Server => server = Some(output),
        }
    }

    match (client, server) {
        (Some(client), Some(server)) => Ok((client, server)),
        _ => Err(Error::Bundler(vec![
            "a target build finished without output".to_string(),
        ])),
    }
}

/// Build one target.
pub async fn build_target(target: &TargetDescriptor, ctx: &BuildContext) -> Result<TargetOutput> {
    let runtime = target.runtime;
    tracing::info!("[{}] building {} entr{}", runtime, target.entry_points.len(), if target.entry_points.len() == 1 { "y" } else { "ies" });

    let inputs = target
        .entry_points
        .iter()
        .map(|(name, path)| {
            let resolved = resolve_entry(&ctx.source_root, name, path, &ctx.resolve_extensions)?;
            Ok(InputItem {
                name: Some(name.clone()),
                import: resolved.to_string_lossy().to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let options = configure_rolldown_options(target, ctx, inputs);

    let plugin = Arc::new(LoaderPlugin::new(
        runtime,
        target.external_policy.clone(),
        Arc::clone(&ctx.rules),
        ctx.source_root.clone(),
        ctx.public_path.clone(),
        ctx.optimizations,
    ));
    let plugins: Vec<SharedPluginable> = vec![plugin.clone()];

    let generated = match BundlerBuilder::default()
        .with_options(options)
        .with_plugins(plugins)
        .build()
    {
        Ok(mut bundler) => bundler.generate().await,
        Err(e) => return Err(Error::from_rolldown_batch(&e)),
    };

    let state = plugin.take_state();
    let bundle = match generated {
        Ok(bundle) => bundle,
        Err(e) => return Err(failure_from_state(&state).unwrap_or_else(|| Error::from_rolldown_batch(&e))),
    };

    let mut entry_files = BTreeMap::new();
    let mut artifacts = Vec::new();
    let mut module_order = Vec::new();

    for output in &bundle.assets {
        match output {
            Output::Chunk(chunk) => {
                module_order.extend(
                    chunk
                        .module_ids
                        .iter()
                        .map(|id| display_id(&ctx.source_root, Path::new(&**id))),
                );
                let file_name = if chunk.is_entry {
                    let file_name = format!("{}.js", chunk.name);
                    entry_files.insert(chunk.name.to_string(), file_name.clone());
                    file_name
                } else {
                    chunk.filename.to_string()
                };
                artifacts.push(Artifact {
                    file_name,
                    kind: ArtifactKind::Script,
                    contents: chunk.code.clone().into_bytes(),
                });
            }
            Output::Asset(asset) => {
                if runtime.emits_static_assets() {
                    artifacts.push(Artifact {
                        file_name: asset.filename.to_string(),
                        kind: ArtifactKind::Asset,
                        contents: asset.source.as_bytes().to_vec(),
                    });
                }
            }
        }
    }

    let mut stylesheet = None;
    if runtime.emits_static_assets() {
        if let (Some(css), Some(bundle_name)) = (
            state.stylesheet_bundle(&ctx.optimizations, &module_order),
            target.entry_points.keys().next(),
        ) {
            let file_name = format!("{bundle_name}.css");
            artifacts.push(Artifact {
                file_name: file_name.clone(),
                kind: ArtifactKind::Stylesheet,
                contents: css.into_bytes(),
            });
            stylesheet = Some(file_name);
        }

        for (file_name, source) in &state.assets {
            artifacts.push(Artifact {
                file_name: file_name.clone(),
                kind: ArtifactKind::Asset,
                contents: read_asset(source)?,
            });
        }
    }

    artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let report = ExternalizationReport::from_state(&state);
    tracing::info!(
        "[{}] {} modules inlined, {} external, {} artifacts",
        runtime,
        report.inlined.len(),
        report.externals.len(),
        artifacts.len()
    );

    Ok(TargetOutput {
        runtime,
        output_dir: target.output_dir.clone(),
        entry_files,
        stylesheet,
        artifacts,
        report,
    })
}

fn configure_rolldown_options(
    target: &TargetDescriptor,
    ctx: &BuildContext,
    inputs: Vec<InputItem>,
) -> BundlerOptions {
    let conditions = target.runtime.conditions();

    let mut options = BundlerOptions {
        input: Some(inputs),
        cwd: Some(ctx.source_root.clone()),
        format: Some(target.library_form.output_format()),
        platform: Some(target.runtime.platform()),
        resolve: Some(ResolveOptions {
            condition_names: Some(conditions.to_vec()),
            main_fields: Some(conditions.main_fields()),
            extensions: Some(ctx.resolve_extensions.clone()),
            modules: Some(node_modules_dirs(&ctx.source_root)),
            ..Default::default()
        }),
        ..Default::default()
    };

    ctx.optimizations.apply(&mut options);
    options
}

/// `node_modules` of the source root and every ancestor.
fn node_modules_dirs(source_root: &Path) -> Vec<String> {
    let mut dirs: Vec<String> = source_root
        .ancestors()
        .map(|dir| dir.join("node_modules").to_string_lossy().to_string())
        .collect();
    dirs.push("node_modules".to_string());
    dirs
}

/// Loader-level failures take precedence over Rolldown's generic wrapping.
fn failure_from_state(state: &LoaderState) -> Option<Error> {
    if let Some(path) = state.unmatched.first() {
        return Some(Error::UnmatchedFileType { path: path.clone() });
    }
    state
        .stylesheet_failures
        .first()
        .map(|(path, message)| Error::Stylesheet {
            path: path.clone(),
            message: message.clone(),
        })
}

fn read_asset(source: &Path) -> Result<Vec<u8>> {
    std::fs::read(source).map_err(|e| Error::IoError {
        message: format!("Failed to read asset '{}': {}", source.display(), e),
        source: e,
    })
}
