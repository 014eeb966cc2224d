use std::fs;

use duet_bundler::{
    ArtifactKind, BuildContext, BuildDefinition, Error, RuntimeEnvironment, build_all,
    build_target,
};
use duet_config::{BuildManifest, MANIFEST_FILE_NAME};

mod helpers;
use helpers::{LOGO_BYTES, build_project, config_for, create_app_project, scoped_token, write};

#[tokio::test]
async fn client_target_emits_script_stylesheet_and_assets() {
    let project = create_app_project();
    let output = build_project(project.path()).await.expect("build");

    let client = &output.client;
    assert_eq!(client.runtime, RuntimeEnvironment::Browser);
    assert_eq!(
        client.entry_files.get("client.bundle").map(String::as_str),
        Some("client.bundle.js")
    );
    assert_eq!(client.stylesheet.as_deref(), Some("client.bundle.css"));

    let code = client.entry_code("client.bundle").expect("client code");
    assert!(code.contains("Hello duet"));
    assert!(!code.contains("process.env.NODE_ENV"));
    assert!(
        !code.contains("DEV_ONLY_BRANCH"),
        "development-only branch should be compiled away"
    );

    let css = client
        .artifact("client.bundle.css")
        .and_then(|a| a.text())
        .expect("stylesheet");
    assert!(css.contains("App_title-"));
    assert!(css.contains("theme_banner-"));

    let logo = client.artifact("img/logo.png").expect("copied image");
    assert_eq!(logo.kind, ArtifactKind::Asset);
    assert_eq!(logo.contents, LOGO_BYTES);
    assert!(code.contains("/img/logo.png"));
}

#[tokio::test]
async fn server_target_keeps_packages_external() {
    let project = create_app_project();
    let output = build_project(project.path()).await.expect("build");

    let server = &output.server;
    assert_eq!(server.runtime, RuntimeEnvironment::Server);
    assert!(server.stylesheet.is_none());
    assert!(
        server
            .artifacts
            .iter()
            .all(|a| a.kind == ArtifactKind::Script),
        "server target must not emit stylesheets or assets"
    );

    let report = &server.report;
    assert!(report.externals.contains("react"));
    assert!(report.externals.contains("react-dom/server"));
    assert!(report.allow_listed.contains("react-dom/server"));
    assert!(report.inlined.contains("App.jsx"));
    assert!(!report.inlined.iter().any(|id| id.contains("node_modules")));

    let code = server.entry_code("server.bundle").expect("server code");
    assert!(code.contains("react-dom/server"));
    assert!(code.contains("Hello duet"));
}

#[tokio::test]
async fn server_default_export_uses_commonjs_interop() {
    let project = create_app_project();
    write(
        &project.path().join("src"),
        "server.jsx",
        r#"
import { renderToString } from 'react-dom/server';
import App from './App.jsx';

export default function render() {
    return renderToString(App());
}
"#,
    );

    let output = build_project(project.path()).await.expect("build");
    let code = output.server.entry_code("server.bundle").expect("server code");
    assert!(code.contains("module.exports="), "{code}");
}

#[tokio::test]
async fn extracted_css_follows_import_order() {
    let project = create_app_project();
    let src = project.path().join("src");
    write(&src, "z_reset.css", "h1 { color: black; }\n");
    write(&src, "a_app.css", "h1 { color: red; }\n");
    write(
        &src,
        "client.jsx",
        r#"
import './z_reset.css';
import './a_app.css';
import App from './App.jsx';

window.__DUET__ = App();
"#,
    );

    let output = build_project(project.path()).await.expect("build");
    let css = output
        .client
        .artifact("client.bundle.css")
        .and_then(|a| a.text())
        .expect("stylesheet");

    let reset = css.find("h1{color:#000}").expect("reset rule");
    let app = css.find("h1{color:red}").expect("app rule");
    assert!(reset < app, "reset must precede app rules: {css}");
}

#[tokio::test]
async fn scoped_class_names_agree_between_targets() {
    let project = create_app_project();
    let output = build_project(project.path()).await.expect("build");

    let css = output
        .client
        .artifact("client.bundle.css")
        .and_then(|a| a.text())
        .expect("stylesheet");
    let class = scoped_token(css, "App_title-").expect("scoped class in css");

    let server_code = output.server.entry_code("server.bundle").expect("server code");
    assert!(
        server_code.contains(class),
        "server bundle should reference {class}"
    );
    let client_code = output.client.entry_code("client.bundle").expect("client code");
    assert!(client_code.contains(class));
}

#[tokio::test]
async fn unmatched_file_type_fails_the_build() {
    let project = create_app_project();
    let src = project.path().join("src");
    write(&src, "data.json", "{\"a\": 1}");
    write(
        &src,
        "client.jsx",
        "import data from './data.json';\nwindow.__DUET__ = data;\n",
    );

    let err = build_project(project.path()).await.expect_err("must fail");
    match err {
        Error::UnmatchedFileType { path } => assert!(path.ends_with("data.json")),
        other => panic!("expected UnmatchedFileType, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_entry_is_reported_with_bundle_name() {
    let project = create_app_project();
    fs::remove_file(project.path().join("src/server.jsx")).expect("remove entry");

    let err = build_project(project.path()).await.expect_err("must fail");
    match err {
        Error::UnresolvedEntry { bundle, .. } => assert_eq!(bundle, "server.bundle"),
        other => panic!("expected UnresolvedEntry, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_stylesheet_fails_the_build() {
    let project = create_app_project();
    write(
        &project.path().join("src"),
        "theme.scss",
        ".banner { color: $missing; }\n",
    );

    let err = build_project(project.path()).await.expect_err("must fail");
    match err {
        Error::Stylesheet { path, .. } => assert!(path.ends_with("theme.scss")),
        other => panic!("expected Stylesheet, got {other:?}"),
    }
}

#[tokio::test]
async fn rebuilding_unchanged_sources_is_identical() {
    let project = create_app_project();
    let first = build_project(project.path()).await.expect("first build");
    let second = build_project(project.path()).await.expect("second build");

    for (a, b) in [(&first.client, &second.client), (&first.server, &second.server)] {
        assert_eq!(a.report, b.report);
        let names = |t: &duet_bundler::TargetOutput| {
            t.artifacts
                .iter()
                .map(|a| (a.file_name.clone(), a.contents.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(names(a), names(b));
    }
}

#[tokio::test]
async fn sequential_build_matches_parallel() {
    let project = create_app_project();
    let config = config_for(project.path());
    let definition = BuildDefinition::from_config(&config);

    let parallel = build_all(&definition, &BuildContext::from_config(&config))
        .await
        .expect("parallel");
    let sequential = build_all(&definition, &BuildContext::from_config(&config).sequential())
        .await
        .expect("sequential");

    assert_eq!(parallel.manifest(), sequential.manifest());
    assert_eq!(parallel.server.report, sequential.server.report);
}

#[tokio::test]
async fn single_target_can_be_built_alone() {
    let project = create_app_project();
    let config = config_for(project.path());
    let definition = BuildDefinition::from_config(&config);

    let server = build_target(&definition.server, &BuildContext::from_config(&config))
        .await
        .expect("server build");
    assert_eq!(server.output_dir, project.path().join("dist/server"));
    assert!(server.artifact("server.bundle.js").is_some());
}

#[tokio::test]
async fn write_emits_both_trees_and_manifest() {
    let project = create_app_project();
    let output = build_project(project.path()).await.expect("build");
    output.write().expect("write");

    let client_dir = project.path().join("dist/client");
    let server_dir = project.path().join("dist/server");
    assert!(client_dir.join("client.bundle.js").is_file());
    assert!(client_dir.join("client.bundle.css").is_file());
    assert!(client_dir.join("img/logo.png").is_file());
    assert!(server_dir.join("server.bundle.js").is_file());
    assert!(!server_dir.join("img").exists());

    let manifest = BuildManifest::read(&server_dir.join(MANIFEST_FILE_NAME)).expect("manifest");
    assert_eq!(manifest.script_url(), "/client.bundle.js");
    assert_eq!(manifest.stylesheet_url().as_deref(), Some("/client.bundle.css"));
    assert_eq!(manifest.server_entry, "server.bundle.js");
    assert_eq!(manifest.assets, vec!["img/logo.png".to_string()]);
    assert!(manifest.externals.contains(&"react".to_string()));
}
