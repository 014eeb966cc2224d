//! End-to-end tests for the `duet` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn create_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/App.css", ".title { color: red; }\n");
    write(
        root,
        "src/App.jsx",
        "import styles from './App.css';\nexport default () => styles.title;\n",
    );
    write(
        root,
        "src/client.jsx",
        "import App from './App.jsx';\nwindow.__DUET__ = App();\n",
    );
    write(
        root,
        "src/server.jsx",
        "import { renderToString } from 'react-dom/server';\nimport App from './App.jsx';\nexport const render = () => renderToString(App());\n",
    );
    dir
}

fn duet() -> Command {
    let mut cmd = Command::cargo_bin("duet").unwrap();
    cmd.env_remove("NODE_ENV").env_remove("RUST_LOG").arg("--no-color");
    cmd
}

#[test]
fn check_passes_on_clean_project() {
    let project = create_project();
    duet()
        .args(["check", "--cwd"])
        .arg(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid"));
}

#[test]
fn check_lists_files_without_a_loader_rule() {
    let project = create_project();
    write(project.path(), "src/data.json", "{}");

    duet()
        .args(["check", "--cwd"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("data.json"));
}

#[test]
fn check_reports_missing_entry() {
    let project = create_project();
    fs::remove_file(project.path().join("src/client.jsx")).unwrap();

    duet()
        .args(["check", "--cwd"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("client.bundle"));
}

#[test]
fn build_writes_client_server_and_manifest() {
    let project = create_project();
    duet()
        .args(["build", "--cwd"])
        .arg(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Build complete"));

    let root = project.path();
    assert!(root.join("dist/client/client.bundle.js").is_file());
    assert!(root.join("dist/client/client.bundle.css").is_file());
    assert!(root.join("dist/server/server.bundle.js").is_file());
    assert!(root.join("dist/server/duet-manifest.json").is_file());
}

#[test]
fn build_honours_config_file() {
    let project = create_project();
    write(
        project.path(),
        "duet.toml",
        "[build]\nclient_output_dir = \"public\"\nserver_output_dir = \"server-dist\"\n",
    );

    duet()
        .args(["build", "--cwd"])
        .arg(project.path())
        .assert()
        .success();

    assert!(project.path().join("public/client.bundle.js").is_file());
    assert!(project.path().join("server-dist/server.bundle.js").is_file());
}

#[test]
fn missing_explicit_config_fails() {
    let project = create_project();
    duet()
        .args(["build", "--config", "nope.toml", "--cwd"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}
