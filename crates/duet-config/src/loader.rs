//! Loader rule set: file extension → handling strategy.
//!
//! Rules are ordered and the first rule whose pattern accepts a path wins. The
//! same rule set is handed to both build targets so that asset references the
//! server renders agree with the files the client emits.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Scoped class-name template applied by the CSS modules transform.
pub const SCOPED_CLASS_PATTERN: &str = "[name]_[local]-[hash]";

/// Extension predicate of a loader rule.
///
/// Extensions are stored without the leading dot and compared
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPattern {
    pub extensions: Vec<String>,
}

impl MatchPattern {
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }
}

/// A named step in a rule's transform chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Transform {
    /// Script transpilation (JSX and modern syntax), handled by the bundler itself.
    Transpile,
    /// SCSS → CSS compilation.
    Sass,
    /// CSS modules scoping; `pattern` is the generated class-name template.
    CssModules { pattern: String },
    /// Pull the resulting CSS out into the bundle stylesheet.
    Extract,
    /// Emit the file verbatim and export its public URL.
    File,
}

/// How the bundler treats files selected by a rule, derived from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Script,
    Stylesheet { sass: bool },
    File,
}

/// Output file naming template.
///
/// Supports `[name]` (file stem) and `[ext]` (extension as written on disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputNaming(pub String);

impl OutputNaming {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn template(&self) -> &str {
        &self.0
    }

    /// Render the template for a source path.
    pub fn render(&self, path: &Path) -> String {
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        self.0.replace("[name]", name).replace("[ext]", ext)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderRule {
    pub name: String,
    pub match_pattern: MatchPattern,
    pub transform_chain: Vec<Transform>,
    pub output_naming: OutputNaming,
}

impl LoaderRule {
    pub fn new(
        name: impl Into<String>,
        match_pattern: MatchPattern,
        transform_chain: Vec<Transform>,
        output_naming: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            match_pattern,
            transform_chain,
            output_naming: OutputNaming::new(output_naming),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.match_pattern.matches(path)
    }

    pub fn strategy(&self) -> Strategy {
        let has = |t: fn(&Transform) -> bool| self.transform_chain.iter().any(t);

        if has(|t| matches!(t, Transform::File)) {
            Strategy::File
        } else if has(|t| matches!(t, Transform::CssModules { .. } | Transform::Extract)) {
            Strategy::Stylesheet {
                sass: has(|t| matches!(t, Transform::Sass)),
            }
        } else {
            Strategy::Script
        }
    }

    /// Class-name template of the CSS modules step, if the chain has one.
    pub fn scoped_class_pattern(&self) -> Option<&str> {
        self.transform_chain.iter().find_map(|t| match t {
            Transform::CssModules { pattern } => Some(pattern.as_str()),
            _ => None,
        })
    }
}

/// Ordered, first-match-wins list of loader rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<LoaderRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<LoaderRule>) -> Self {
        Self { rules }
    }

    pub fn select(&self, path: &Path) -> Option<&LoaderRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Like [`RuleSet::select`], but an unmatched path is an error naming it.
    pub fn require(&self, path: &Path) -> Result<&LoaderRule> {
        self.select(path)
            .ok_or_else(|| ConfigError::NoLoaderRule(PathBuf::from(path)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoaderRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        let css_modules = || Transform::CssModules {
            pattern: SCOPED_CLASS_PATTERN.to_string(),
        };

        Self::new(vec![
            LoaderRule::new(
                "script",
                MatchPattern::extensions(["js", "jsx", "mjs", "cjs"]),
                vec![Transform::Transpile],
                "[name].js",
            ),
            LoaderRule::new(
                "stylesheet",
                MatchPattern::extensions(["css"]),
                vec![css_modules(), Transform::Extract],
                "[name].css",
            ),
            LoaderRule::new(
                "sass",
                MatchPattern::extensions(["scss"]),
                vec![Transform::Sass, css_modules(), Transform::Extract],
                "[name].css",
            ),
            LoaderRule::new(
                "image",
                MatchPattern::extensions(["jpg", "jpeg", "png", "gif", "svg"]),
                vec![Transform::File],
                "img/[name].[ext]",
            ),
            LoaderRule::new(
                "markup",
                MatchPattern::extensions(["html"]),
                vec![Transform::File],
                "[name].[ext]",
            ),
            LoaderRule::new(
                "icon",
                MatchPattern::extensions(["ico"]),
                vec![Transform::File],
                "[name].[ext]",
            ),
        ])
    }
}
