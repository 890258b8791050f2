//! File-access runtime abstraction.
//!
//! The loader never touches the filesystem directly. Everything it reads goes
//! through a [`Runtime`], which lets callers observe (or fake) file access.

mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use native::NativeRuntime;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(String),

    /// A module reference could not be turned into a path.
    #[error("Failed to resolve '{specifier}' from '{from}': {reason}")]
    ResolutionFailed {
        specifier: String,
        from: PathBuf,
        reason: String,
    },

    #[error("Runtime error: {0}")]
    Other(String),
}

/// File access capability used by module loading.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a whole file.
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Resolve `specifier` relative to the file `from`.
    ///
    /// Absolute specifiers are returned as-is. Relative ones are joined to
    /// the directory of `from` and lexically cleaned; the result need not
    /// exist.
    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf>;
}
