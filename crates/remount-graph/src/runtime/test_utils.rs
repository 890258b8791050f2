//! Test utilities for remount-graph.
//!
//! [`MemoryRuntime`] serves files from an in-memory map, so loader and
//! tracker tests can describe a module tree without touching disk.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::native::resolve_relative;
use super::{Runtime, RuntimeError, RuntimeResult};

/// In-memory runtime keyed by absolute path.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), content.into());
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn remove(&self, path: &Path) {
        self.files.lock().remove(path);
    }

    /// Every path passed to `read_file`, in call order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().clone()
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.reads.lock().push(path.to_path_buf());
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        resolve_relative(specifier, from)
    }
}
