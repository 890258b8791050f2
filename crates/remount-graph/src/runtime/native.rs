//! Native filesystem runtime.

// The module loader reaches the filesystem only through this runtime
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use tokio::task;

use super::{Runtime, RuntimeError, RuntimeResult};

/// `Runtime` over the real filesystem.
///
/// Blocking reads run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = path.to_path_buf();

        task::spawn_blocking(move || {
            std::fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RuntimeError::FileNotFound(path.clone())
                } else {
                    RuntimeError::Io(format!("Failed to read {}: {}", path.display(), e))
                }
            })
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        resolve_relative(specifier, from)
    }
}

/// Shared resolution rule for runtimes backed by real paths.
pub(crate) fn resolve_relative(specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
    let specifier = specifier.trim();
    if specifier.is_empty() {
        return Err(RuntimeError::ResolutionFailed {
            specifier: specifier.to_string(),
            from: from.to_path_buf(),
            reason: "empty path".to_string(),
        });
    }

    let candidate = Path::new(specifier);
    if candidate.is_absolute() {
        return Ok(candidate.clean());
    }

    let from_dir = from.parent().unwrap_or(Path::new(""));
    Ok(from_dir.join(candidate).clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_file_and_not_found() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("routes.toml");
        std::fs::write(&file, b"stack = []").unwrap();

        let runtime = NativeRuntime::new();
        assert_eq!(runtime.read_file(&file).await.unwrap(), b"stack = []");
        assert!(runtime.exists(&file));

        let missing = temp.path().join("missing.toml");
        assert!(!runtime.exists(&missing));
        assert_eq!(
            runtime.read_file(&missing).await,
            Err(RuntimeError::FileNotFound(missing))
        );
    }

    #[test]
    fn test_directories_do_not_exist_as_files() {
        let temp = TempDir::new().unwrap();
        assert!(!NativeRuntime::new().exists(temp.path()));
    }

    #[test]
    fn test_resolve_relative_to_parent_dir() {
        let from = Path::new("/srv/mock/routes.toml");
        let runtime = NativeRuntime::new();

        assert_eq!(
            runtime.resolve("api/routes.toml", from).unwrap(),
            PathBuf::from("/srv/mock/api/routes.toml")
        );
        assert_eq!(
            runtime.resolve("./fixtures/../user.json", from).unwrap(),
            PathBuf::from("/srv/mock/user.json")
        );
        assert_eq!(
            runtime.resolve("/etc/hosts", from).unwrap(),
            PathBuf::from("/etc/hosts")
        );
        assert!(runtime.resolve("  ", from).is_err());
    }
}
