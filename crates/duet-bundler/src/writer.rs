//! Artifact writing with path validation and all-or-nothing semantics.
//!
//! Every artifact name is cleaned and must stay inside the target's output
//! directory. Contents go to `<name>.tmp` siblings first; only when every
//! temporary file is written are they renamed into place. On failure the
//! temporary files are removed.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::build::Artifact;
use crate::{Error, Result};

/// Write artifacts into `dir`, returning the final paths in input order.
pub fn write_artifacts(artifacts: &[Artifact], dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = normalize_dir(dir)?;

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let operations = artifacts
        .iter()
        .map(|artifact| {
            validate_output_path(&dir, &artifact.file_name)
                .map(|path| (path, artifact.contents.as_slice()))
        })
        .collect::<Result<Vec<_>>>()?;

    write_files_atomic(&operations)?;

    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

fn normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    let cwd = std::env::current_dir().map_err(|e| {
        Error::InvalidOutputPath(format!("Failed to get current directory: {}", e))
    })?;
    Ok(cwd.join(cleaned).clean())
}

/// Join `filename` onto `base_dir`, rejecting anything that escapes it.
pub(crate) fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("Empty file name".to_string()));
    }
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(operations.len());

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = temp_path_for(target_path);
        fs::write(&temp_path, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        temp_files.push((temp_path, target_path.clone()));
    }

    for (temp_path, target_path) in &temp_files {
        fs::rename(temp_path, target_path).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            ))
        })?;
    }

    Ok(())
}

fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                tracing::warn!(
                    "Failed to clean up temporary file '{}': {}",
                    temp_path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::ArtifactKind;

    fn artifact(name: &str, contents: &str) -> Artifact {
        Artifact {
            file_name: name.to_string(),
            kind: ArtifactKind::Script,
            contents: contents.as_bytes().to_vec(),
        }
    }

    #[test]
    fn nested_names_stay_inside_base() {
        let base = Path::new("/tmp/output");
        assert_eq!(
            validate_output_path(base, "img/logo.png").unwrap(),
            Path::new("/tmp/output/img/logo.png")
        );
        assert_eq!(
            validate_output_path(base, "./client.bundle.js").unwrap(),
            Path::new("/tmp/output/client.bundle.js")
        );
    }

    #[test]
    fn traversal_is_rejected() {
        let base = Path::new("/tmp/output");
        assert!(matches!(
            validate_output_path(base, "../etc/passwd"),
            Err(Error::InvalidOutputPath(_))
        ));
        assert!(validate_output_path(base, "img/../../../../etc/passwd").is_err());
        assert!(validate_output_path(base, "a\0b.js").is_err());
        assert!(validate_output_path(base, "").is_err());
    }

    #[test]
    fn bundle_names_with_shared_stem_do_not_collide() {
        let dir = tempfile::TempDir::new().unwrap();
        let written = write_artifacts(
            &[
                artifact("client.bundle.js", "js"),
                artifact("client.bundle.css", "css"),
            ],
            dir.path(),
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("client.bundle.js")).unwrap(), "js");
        assert_eq!(fs::read_to_string(dir.path().join("client.bundle.css")).unwrap(), "css");
        assert!(!dir.path().join("client.bundle.js.tmp").exists());
    }

    #[test]
    fn invalid_name_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = write_artifacts(
            &[artifact("ok.js", "x"), artifact("../escape.js", "y")],
            dir.path(),
        );
        assert!(result.is_err());
        assert!(!dir.path().join("ok.js").exists());
    }
}
