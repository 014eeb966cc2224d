//! Stylesheet compilation: SCSS via grass, scoping and printing via lightningcss.
//!
//! The scoped class names depend only on the file's path relative to the source
//! root, so the browser and server targets produce the same names and the
//! server-rendered markup lines up with the extracted stylesheet.

use std::collections::BTreeMap;
use std::path::Path;

use lightningcss::{
    css_modules::{Config as CssModulesConfig, Pattern},
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StylesheetError {
    #[error("Sass compile error: {0}")]
    Sass(String),

    #[error("invalid scoped class pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("CSS parse error: {0}")]
    Parse(String),

    #[error("CSS minify error: {0}")]
    Minify(String),

    #[error("CSS print error: {0}")]
    Print(String),
}

#[derive(Debug, Clone, Default)]
pub struct StylesheetOptions<'a> {
    /// Path relative to the source root; feeds `[name]` and `[hash]`.
    pub relative_name: &'a str,
    /// Directory searched for Sass `@use`/`@import`.
    pub load_dir: Option<&'a Path>,
    pub sass: bool,
    /// CSS modules class-name template, `None` leaves selectors untouched.
    pub scoped_pattern: Option<&'a str>,
    pub minify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStylesheet {
    pub css: String,
    /// Local class name → scoped class name
    pub classes: BTreeMap<String, String>,
}

impl CompiledStylesheet {
    /// JavaScript module standing in for the stylesheet in the import graph.
    pub fn to_module_code(&self) -> String {
        let map = serde_json::to_string(&self.classes).unwrap_or_else(|_| "{}".to_string());
        format!("export default {map};\n")
    }
}

pub fn compile_stylesheet(
    source: &str,
    options: &StylesheetOptions<'_>,
) -> Result<CompiledStylesheet, StylesheetError> {
    let css = if options.sass {
        compile_sass(source, options)?
    } else {
        source.to_string()
    };

    let pattern = options
        .scoped_pattern
        .map(|p| {
            Pattern::parse(p).map_err(|e| StylesheetError::Pattern {
                pattern: p.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()?;

    let parser_options = ParserOptions {
        filename: options.relative_name.to_string(),
        css_modules: pattern.map(|pattern| CssModulesConfig {
            pattern,
            ..Default::default()
        }),
        ..Default::default()
    };

    let mut stylesheet =
        StyleSheet::parse(&css, parser_options).map_err(|e| StylesheetError::Parse(e.to_string()))?;

    if options.minify {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| StylesheetError::Minify(e.to_string()))?;
    }

    let output = stylesheet
        .to_css(PrinterOptions {
            minify: options.minify,
            ..Default::default()
        })
        .map_err(|e| StylesheetError::Print(e.to_string()))?;

    let classes = output
        .exports
        .map(|exports| {
            exports
                .into_iter()
                .map(|(local, export)| (local, export.name))
                .collect()
        })
        .unwrap_or_default();

    Ok(CompiledStylesheet {
        css: output.code,
        classes,
    })
}

fn compile_sass(source: &str, options: &StylesheetOptions<'_>) -> Result<String, StylesheetError> {
    let mut grass_options = grass::Options::default().style(if options.minify {
        grass::OutputStyle::Compressed
    } else {
        grass::OutputStyle::Expanded
    });

    if let Some(dir) = options.load_dir {
        grass_options = grass_options.load_path(dir);
    }

    grass::from_string(source.to_string(), &grass_options)
        .map_err(|e| StylesheetError::Sass(e.to_string()))
}
