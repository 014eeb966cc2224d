//! HTML document assembly.
//!
//! Production pages reference same-origin bundled assets through the public
//! path; development pages load the client script from the dev asset origin
//! and link no stylesheet.

use std::path::Path;

use duet_config::{BuildManifest, DuetConfig, Environment, MANIFEST_FILE_NAME};
use minijinja::context;
use serde::Serialize;

use crate::error::Result;

const DOCUMENT_TEMPLATE_NAME: &str = "document.html";

const DOCUMENT_TEMPLATE: &str = "<!DOCTYPE html>
<html>

\t<head>
\t\t<meta charset=\"UTF-8\">
\t\t<title>{{ title }}</title>
{% if stylesheet_href %}\t\t<link rel=\"stylesheet\" href=\"{{ stylesheet_href|safe }}\">
{% endif %}\t</head>

\t<body>
\t\t<div id=\"app\">{{ markup|safe }}</div>

\t\t<script src=\"{{ script_src|safe }}\"></script>
\t</body>

</html>";

/// Client asset names as the build emitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentAssets {
    pub public_path: String,
    pub script: String,
    pub stylesheet: Option<String>,
}

impl Default for DocumentAssets {
    fn default() -> Self {
        Self {
            public_path: "/".to_string(),
            script: "client.bundle.js".to_string(),
            stylesheet: Some("client.bundle.css".to_string()),
        }
    }
}

impl DocumentAssets {
    pub fn from_manifest(manifest: &BuildManifest) -> Self {
        Self {
            public_path: manifest.public_path.clone(),
            script: manifest.client.script.clone(),
            stylesheet: manifest.client.stylesheet.clone(),
        }
    }

    /// Read `duet-manifest.json` from a server output directory.
    pub fn load(server_output_dir: &Path) -> Result<Self> {
        let manifest = BuildManifest::read(&server_output_dir.join(MANIFEST_FILE_NAME))?;
        Ok(Self::from_manifest(&manifest))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub environment: Environment,
    pub title: String,
    /// Absolute origin without trailing slash, e.g. `http://localhost:8081`
    pub dev_asset_origin: String,
    pub assets: DocumentAssets,
}

impl RenderConfig {
    pub fn from_config(config: &DuetConfig, assets: DocumentAssets) -> Self {
        Self {
            environment: config.environment,
            title: config.render.title.clone(),
            dev_asset_origin: config.render.dev_asset_origin.clone(),
            assets,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn script_src(&self) -> String {
        if self.environment.is_production() {
            format!("{}{}", self.assets.public_path, self.assets.script)
        } else {
            format!("{}/{}", self.dev_asset_origin, self.assets.script)
        }
    }

    pub fn stylesheet_href(&self) -> Option<String> {
        if !self.environment.is_production() {
            return None;
        }
        self.assets
            .stylesheet
            .as_ref()
            .map(|sheet| format!("{}{}", self.assets.public_path, sheet))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_config(&DuetConfig::default(), DocumentAssets::default())
    }
}

/// Wraps rendered markup into the full page.
#[derive(Debug)]
pub struct DocumentRenderer {
    env: minijinja::Environment<'static>,
    config: RenderConfig,
}

impl DocumentRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        let mut env = minijinja::Environment::new();
        env.add_template(DOCUMENT_TEMPLATE_NAME, DOCUMENT_TEMPLATE)?;
        Ok(Self { env, config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self, markup: &str) -> Result<String> {
        let template = self.env.get_template(DOCUMENT_TEMPLATE_NAME)?;
        let html = template.render(context! {
            title => self.config.title,
            stylesheet_href => self.config.stylesheet_href(),
            markup => markup,
            script_src => self.config.script_src(),
        })?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(environment: Environment) -> DocumentRenderer {
        DocumentRenderer::new(RenderConfig::default().with_environment(environment)).unwrap()
    }

    #[test]
    fn production_document_is_exact() {
        let html = renderer(Environment::Production)
            .render("<p>hi</p>")
            .unwrap();
        let expected = "<!DOCTYPE html>
<html>

\t<head>
\t\t<meta charset=\"UTF-8\">
\t\t<title>React Isomorphic Starter Kit</title>
\t\t<link rel=\"stylesheet\" href=\"/client.bundle.css\">
\t</head>

\t<body>
\t\t<div id=\"app\"><p>hi</p></div>

\t\t<script src=\"/client.bundle.js\"></script>
\t</body>

</html>";
        assert_eq!(html, expected);
    }

    #[test]
    fn development_document_is_exact() {
        let html = renderer(Environment::Development).render("").unwrap();
        let expected = "<!DOCTYPE html>
<html>

\t<head>
\t\t<meta charset=\"UTF-8\">
\t\t<title>React Isomorphic Starter Kit</title>
\t</head>

\t<body>
\t\t<div id=\"app\"></div>

\t\t<script src=\"http://localhost:8081/client.bundle.js\"></script>
\t</body>

</html>";
        assert_eq!(html, expected);
    }

    #[test]
    fn title_is_escaped_but_markup_is_not() {
        let mut config = RenderConfig::default();
        config.title = "A & B".to_string();
        let html = DocumentRenderer::new(config).unwrap().render("<b>x</b>").unwrap();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<div id=\"app\"><b>x</b></div>"));
    }

    #[test]
    fn production_without_stylesheet_links_nothing() {
        let config = RenderConfig {
            assets: DocumentAssets {
                stylesheet: None,
                ..DocumentAssets::default()
            },
            ..RenderConfig::default().with_environment(Environment::Production)
        };
        let html = DocumentRenderer::new(config).unwrap().render("").unwrap();
        assert!(!html.contains("<link"));
        assert!(html.contains("<script src=\"/client.bundle.js\">"));
    }

    #[test]
    fn assets_follow_public_path() {
        let config = RenderConfig {
            assets: DocumentAssets {
                public_path: "/static/".to_string(),
                ..DocumentAssets::default()
            },
            ..RenderConfig::default().with_environment(Environment::Production)
        };
        assert_eq!(config.script_src(), "/static/client.bundle.js");
        assert_eq!(
            config.stylesheet_href().as_deref(),
            Some("/static/client.bundle.css")
        );
    }
}
