//! Entry point resolution.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Resolve an entry path against the source root.
///
/// Tries, in order: the path itself, the path with each extension appended,
/// and `index` + extension inside the path when it names a directory.
pub fn resolve_entry(
    source_root: &Path,
    bundle: &str,
    entry: &Path,
    extensions: &[String],
) -> Result<PathBuf> {
    let base = if entry.is_absolute() {
        entry.to_path_buf()
    } else {
        source_root.join(entry)
    };

    if base.is_file() {
        return Ok(base);
    }

    let mut candidates = Vec::with_capacity(extensions.len() * 2);
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        let mut with_ext = base.clone().into_os_string();
        with_ext.push(".");
        with_ext.push(ext);
        candidates.push(PathBuf::from(with_ext));
    }
    for ext in extensions {
        candidates.push(base.join(format!("index.{}", ext.trim_start_matches('.'))));
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::UnresolvedEntry {
            bundle: bundle.to_string(),
            path: base,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec![".js".to_string(), ".jsx".to_string()]
    }

    #[test]
    fn resolves_extensionless_entry() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("client.jsx"), "").unwrap();

        let resolved = resolve_entry(dir.path(), "client.bundle", Path::new("client"), &exts()).unwrap();
        assert_eq!(resolved, dir.path().join("client.jsx"));
    }

    #[test]
    fn prefers_earlier_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("server.js"), "").unwrap();
        std::fs::write(dir.path().join("server.jsx"), "").unwrap();

        let resolved = resolve_entry(dir.path(), "server.bundle", Path::new("server"), &exts()).unwrap();
        assert_eq!(resolved, dir.path().join("server.js"));
    }

    #[test]
    fn resolves_directory_index() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("client")).unwrap();
        std::fs::write(dir.path().join("client/index.js"), "").unwrap();

        let resolved = resolve_entry(dir.path(), "client.bundle", Path::new("client"), &exts()).unwrap();
        assert_eq!(resolved, dir.path().join("client/index.js"));
    }

    #[test]
    fn missing_entry_names_bundle_and_path() {
        let dir = TempDir::new().unwrap();
        let err = resolve_entry(dir.path(), "client.bundle", Path::new("client"), &exts()).unwrap_err();
        match err {
            Error::UnresolvedEntry { bundle, path } => {
                assert_eq!(bundle, "client.bundle");
                assert_eq!(path, dir.path().join("client"));
            }
            other => panic!("expected UnresolvedEntry, got {other:?}"),
        }
    }
}
