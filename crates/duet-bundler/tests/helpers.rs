//! Shared fixtures for duet-bundler integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use duet_bundler::{BuildContext, BuildDefinition, DualBuildOutput, build_all};
use duet_config::BuildConfig;
use tempfile::TempDir;

/// Smallest valid PNG header; the loader never decodes it.
pub const LOGO_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nlogo";

pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, contents).expect("write fixture");
}

/// An application with a component, a CSS module, a SCSS module, an image
/// and both entries. Scripts avoid JSX syntax so the browser target needs no
/// installed packages.
pub fn create_app_project() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let src = dir.path().join("src");

    write(&src, "App.css", ".title { color: red; }\n.unused { color: green; }\n");
    write(&src, "theme.scss", "$accent: #336699;\n.banner { color: $accent; }\n");
    fs::write(src.join("logo.png"), LOGO_BYTES).expect("write logo");

    write(
        &src,
        "App.jsx",
        r#"
import styles from './App.css';
import logo from './logo.png';

export default function App() {
    return '<h1 class="' + styles.title + '">Hello duet</h1><img src="' + logo + '">';
}
"#,
    );

    write(
        &src,
        "client.jsx",
        r#"
import App from './App.jsx';
import theme from './theme.scss';

window.__DUET__ = App() + theme.banner;

if (process.env.NODE_ENV !== 'production') {
    window.__DUET_DEV__ = 'DEV_ONLY_BRANCH';
}
"#,
    );

    write(
        &src,
        "server.jsx",
        r#"
import React from 'react';
import { renderToString } from 'react-dom/server';
import App from './App.jsx';

export function render() {
    return renderToString(React.createElement('div')) + App();
}
"#,
    );

    dir
}

pub fn config_for(project: &Path) -> BuildConfig {
    BuildConfig::default().rooted_at(project)
}

pub async fn build_project(project: &Path) -> duet_bundler::Result<DualBuildOutput> {
    let config = config_for(project);
    build_all(
        &BuildDefinition::from_config(&config),
        &BuildContext::from_config(&config),
    )
    .await
}

/// The first scoped class token starting with `prefix`, e.g. `App_title-abc123`.
pub fn scoped_token<'a>(haystack: &'a str, prefix: &str) -> Option<&'a str> {
    let start = haystack.find(prefix)?;
    let rest = &haystack[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
