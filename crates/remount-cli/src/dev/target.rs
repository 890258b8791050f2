//! What the user asked to mount.

use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// The mount target, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Path as given on the command line, used in messages
    pub requested_path: PathBuf,
    /// Canonical path of the entry module
    pub resolved_absolute_path: PathBuf,
    /// Directory watched recursively on the first generation
    pub containing_directory: PathBuf,
}

impl TargetSpec {
    /// Resolve `requested` to an entry module.
    ///
    /// A directory target mounts `<dir>/<index_file>`; that file may not
    /// exist yet, the first mount then fails and waits for it.
    pub fn resolve(requested: impl Into<PathBuf>, index_file: &str) -> Result<Self> {
        let requested_path = requested.into();
        let absolute =
            std::fs::canonicalize(&requested_path).map_err(|_| CliError::TargetNotFound {
                path: requested_path.clone(),
                index_file: index_file.to_string(),
            })?;

        let (resolved_absolute_path, containing_directory) = if absolute.is_dir() {
            (absolute.join(index_file), absolute)
        } else {
            let parent = absolute
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| absolute.clone());
            (absolute, parent)
        };

        Ok(Self {
            requested_path,
            resolved_absolute_path,
            containing_directory,
        })
    }

    /// Directory to look for `remount.toml` in, before the target is resolved.
    pub fn search_dir(requested: &Path) -> PathBuf {
        if requested.is_dir() {
            return requested.to_path_buf();
        }
        match requested.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
