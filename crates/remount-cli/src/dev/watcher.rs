//! File system watch over one generation's dependency set.
//!
//! Only the parent directories of dependency files are registered, each
//! non-recursively, and events are filtered down to the files themselves.
//! The first generation additionally watches the target directory
//! recursively, skipping hidden entries, vendored directories and editor
//! scratch files.

use crate::error::Result;
use crate::ui;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use remount_graph::{DependencyFilter, DependencySet};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;

/// Emits the path of every relevant change until dropped.
pub struct DependencyWatcher {
    _watcher: RecommendedWatcher,
    changes: mpsc::UnboundedReceiver<PathBuf>,
}

impl std::fmt::Debug for DependencyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyWatcher").finish_non_exhaustive()
    }
}

impl DependencyWatcher {
    /// Watch `files`, plus everything below `tree` when given.
    ///
    /// # Errors
    ///
    /// Fails if the watcher cannot be created or any existing directory
    /// cannot be watched. A dependency directory that does not exist (the
    /// parent of a module that failed to read) is skipped with a warning.
    pub fn new(files: &DependencySet, tree: Option<&Path>, filter: &DependencyFilter) -> Result<Self> {
        let (tx, changes) = mpsc::unbounded_channel();

        let watched = files.clone();
        let root = tree.map(Path::to_path_buf);
        let event_filter = filter.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Access(_)) {
                    return;
                }
                for path in event.paths {
                    if is_relevant(&path, &watched, root.as_deref(), &event_filter) {
                        tracing::trace!(path = %path.display(), kind = ?event.kind, "change");
                        // Receiver gone means the generation is already restarting
                        let _ = tx.send(path);
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "file watch error"),
        })?;

        if let Some(tree) = tree {
            watcher.watch(tree, RecursiveMode::Recursive)?;
        }

        let dirs: BTreeSet<&Path> = files
            .iter()
            .filter_map(|file| file.parent())
            .filter(|dir| tree.is_none_or(|tree| !dir.starts_with(tree)))
            .collect();
        for dir in dirs {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "dependency directory does not exist");
                ui::warning(&format!("cannot watch {}, it does not exist", dir.display()));
                continue;
            }
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        tracing::debug!(
            files = files.len(),
            tree = ?tree.map(Path::display),
            "watching dependencies"
        );

        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }

    /// Next changed path.
    pub async fn changed(&mut self) -> Option<PathBuf> {
        self.changes.recv().await
    }
}

fn is_relevant(path: &Path, files: &DependencySet, tree: Option<&Path>, filter: &DependencyFilter) -> bool {
    if files.contains(path) {
        return true;
    }
    match tree.and_then(|tree| path.strip_prefix(tree).ok()) {
        Some(relative) => !should_ignore(relative, filter),
        None => false,
    }
}

/// Hidden entries, vendored directories and editor scratch files below the
/// watched tree.
fn should_ignore(relative: &Path, filter: &DependencyFilter) -> bool {
    let hidden_or_vendored = relative.components().any(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name.starts_with('.') || filter.is_vendor_dir(&name)
        }
        _ => false,
    });
    hidden_or_vendored
        || relative
            .file_name()
            .is_some_and(|name| is_editor_artifact(&name.to_string_lossy()))
}

/// Backup, swap and probe files editors write next to the file being saved.
fn is_editor_artifact(name: &str) -> bool {
    name.ends_with('~')
        || (name.len() > 1 && name.starts_with('#') && name.ends_with('#'))
        || name.bytes().all(|b| b.is_ascii_digit())
        || matches!(
            Path::new(name).extension().and_then(|ext| ext.to_str()),
            Some("swp" | "swo" | "swx")
        )
}
