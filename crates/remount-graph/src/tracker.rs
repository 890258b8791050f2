//! Dependency tracking across one mount pass.
//!
//! A [`DependencyTracker`] is created once and shared with a
//! [`TrackingRuntime`] that sits between the loader and the real runtime.
//! Each generation calls [`DependencyTracker::begin_tracking`] to swap in a
//! fresh record; reads made through the runtime afterwards land in it.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::runtime::{Runtime, RuntimeResult};

/// Files one mount pass loaded.
pub type DependencySet = BTreeSet<PathBuf>;

/// Directory names treated as vendored code unless configured otherwise.
pub const DEFAULT_VENDOR_DIRS: [&str; 3] = ["node_modules", "vendor", "target"];

/// Which files are never recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyFilter {
    excluded_roots: Vec<PathBuf>,
    vendor_dirs: Vec<String>,
}

impl DependencyFilter {
    pub fn new(excluded_roots: Vec<PathBuf>, vendor_dirs: Vec<String>) -> Self {
        Self {
            excluded_roots,
            vendor_dirs,
        }
    }

    /// A filter that records every file.
    pub fn none() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn with_excluded_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.excluded_roots.push(root.into());
        self
    }

    pub fn with_vendor_dir(mut self, name: impl Into<String>) -> Self {
        self.vendor_dirs.push(name.into());
        self
    }

    pub fn excluded_roots(&self) -> &[PathBuf] {
        &self.excluded_roots
    }

    pub fn vendor_dirs(&self) -> &[String] {
        &self.vendor_dirs
    }

    /// Whether `name` is a vendored directory name (e.g. `node_modules`).
    pub fn is_vendor_dir(&self, name: &str) -> bool {
        self.vendor_dirs.iter().any(|dir| dir == name)
    }

    /// Whether `path` lies under an excluded root or inside a vendor dir.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded_roots.iter().any(|root| path.starts_with(root)) {
            return true;
        }

        path.components().any(|component| match component {
            Component::Normal(name) => name.to_str().is_some_and(|name| self.is_vendor_dir(name)),
            _ => false,
        })
    }
}

impl Default for DependencyFilter {
    /// Excludes the running executable's directory and the default vendor dirs.
    fn default() -> Self {
        let excluded_roots = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .into_iter()
            .collect();

        Self::new(
            excluded_roots,
            DEFAULT_VENDOR_DIRS.iter().map(|dir| dir.to_string()).collect(),
        )
    }
}

/// Records the files loaded while a module is being mounted.
///
/// Cloning shares the tracker.
#[derive(Debug, Clone)]
pub struct DependencyTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug)]
struct TrackerInner {
    filter: DependencyFilter,
    current: Mutex<Arc<Mutex<DependencySet>>>,
}

impl DependencyTracker {
    pub fn new(filter: DependencyFilter) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                filter,
                current: Mutex::new(Arc::default()),
            }),
        }
    }

    pub fn filter(&self) -> &DependencyFilter {
        &self.inner.filter
    }

    /// Start a fresh, empty record and return its handle.
    ///
    /// Earlier handles keep their contents but stop receiving files.
    pub fn begin_tracking(&self) -> TrackingHandle {
        let record = Arc::new(Mutex::new(DependencySet::new()));
        *self.inner.current.lock() = Arc::clone(&record);
        TrackingHandle { record }
    }

    /// Record `path` into the current record.
    ///
    /// Returns `true` when the path was newly recorded, `false` when it was
    /// already present or is excluded.
    pub fn record(&self, path: &Path) -> bool {
        if self.inner.filter.is_excluded(path) {
            tracing::trace!(path = %path.display(), "skipping excluded dependency");
            return false;
        }

        let record = Arc::clone(&self.inner.current.lock());
        let inserted = record.lock().insert(path.to_path_buf());
        if inserted {
            tracing::trace!(path = %path.display(), "recorded dependency");
        }
        inserted
    }
}

/// View of one generation's record.
#[derive(Debug, Clone)]
pub struct TrackingHandle {
    record: Arc<Mutex<DependencySet>>,
}

impl TrackingHandle {
    /// Snapshot of the files recorded so far.
    pub fn recorded_files(&self) -> DependencySet {
        self.record.lock().clone()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.record.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.record.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.lock().is_empty()
    }
}

/// Runtime decorator that records every existing file read through it.
#[derive(Debug)]
pub struct TrackingRuntime {
    inner: Arc<dyn Runtime>,
    tracker: DependencyTracker,
}

impl TrackingRuntime {
    pub fn new(inner: Arc<dyn Runtime>, tracker: DependencyTracker) -> Self {
        Self { inner, tracker }
    }

    pub fn tracker(&self) -> &DependencyTracker {
        &self.tracker
    }
}

#[async_trait]
impl Runtime for TrackingRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        // Record before reading so a file that fails to parse is still watched
        if self.inner.exists(path) {
            self.tracker.record(path);
        }
        self.inner.read_file(path).await
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        self.inner.resolve(specifier, from)
    }
}
