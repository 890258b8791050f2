//! Error types for module loading.

use std::path::{Path, PathBuf};

use crate::runtime::RuntimeError;

pub type Result<T> = std::result::Result<T, LoadError>;

/// Why a module tree could not be mounted.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("invalid module {}: {message}", .path.display())]
    Syntax { path: PathBuf, message: String },

    /// `entry` is 1-based, counting `[[stack]]` tables in file order.
    #[error("invalid stack entry #{entry} in {}: {reason}", .path.display())]
    InvalidEntry {
        path: PathBuf,
        entry: usize,
        reason: String,
    },

    #[error("mount cycle: {}", format_chain(.chain))]
    Cycle { chain: Vec<PathBuf> },
}

impl LoadError {
    /// The file the error points at.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LoadError::Read { path, .. }
            | LoadError::Syntax { path, .. }
            | LoadError::InvalidEntry { path, .. } => Some(path),
            LoadError::Cycle { chain } => chain.last().map(PathBuf::as_path),
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message() {
        let err = LoadError::Cycle {
            chain: vec!["/a.toml".into(), "/b.toml".into(), "/a.toml".into()],
        };
        assert_eq!(err.to_string(), "mount cycle: /a.toml -> /b.toml -> /a.toml");
        assert_eq!(err.path(), Some(Path::new("/a.toml")));
    }

    #[test]
    fn test_entry_message() {
        let err = LoadError::InvalidEntry {
            path: "/srv/routes.toml".into(),
            entry: 2,
            reason: "route declares no paths".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid stack entry #2 in /srv/routes.toml: route declares no paths"
        );
    }
}
