//! Per-generation state shared between the request handler and the
//! orchestrator.

use parking_lot::RwLock;
use remount_routes::RoutingTree;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Body served while nothing is mounted, or when no route matches.
pub const FALLBACK_TEXT: &str = "Unknown handler or waiting for changes…";

/// Mount status of one generation.
#[derive(Debug, Clone, Default)]
pub enum MountStatus {
    /// Listening, module not loaded yet
    #[default]
    Pending,
    /// Router installed
    Mounted(Arc<RoutingTree>),
    /// Load failed; serving the fallback until the next change
    Failed { error: String },
}

impl MountStatus {
    pub fn is_mounted(&self) -> bool {
        matches!(self, MountStatus::Mounted(_))
    }

    pub fn tree(&self) -> Option<Arc<RoutingTree>> {
        match self {
            MountStatus::Mounted(tree) => Some(Arc::clone(tree)),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MountStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// A request the mounted router could not answer because of a broken file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to serve {}: {reason}", .path.display())]
pub struct RuntimeFailure {
    /// Generation that hit the failure
    pub generation: u64,
    pub path: PathBuf,
    pub reason: String,
}

/// State of one server instance.
#[derive(Debug)]
pub struct GenerationState {
    id: u64,
    status: RwLock<MountStatus>,
    failures: mpsc::UnboundedSender<RuntimeFailure>,
}

/// Shared handle used by the request handler.
pub type SharedState = Arc<GenerationState>;

impl GenerationState {
    pub fn new(id: u64, failures: mpsc::UnboundedSender<RuntimeFailure>) -> SharedState {
        Arc::new(Self {
            id,
            status: RwLock::new(MountStatus::Pending),
            failures,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> MountStatus {
        self.status.read().clone()
    }

    /// Router for dispatching, if one is installed.
    pub fn tree(&self) -> Option<Arc<RoutingTree>> {
        self.status.read().tree()
    }

    pub fn mount(&self, tree: RoutingTree) {
        *self.status.write() = MountStatus::Mounted(Arc::new(tree));
    }

    pub fn fail(&self, error: impl Into<String>) {
        *self.status.write() = MountStatus::Failed {
            error: error.into(),
        };
    }

    /// Hand a failed request over to the controller.
    pub fn report_failure(&self, path: PathBuf, reason: impl Into<String>) {
        let failure = RuntimeFailure {
            generation: self.id,
            path,
            reason: reason.into(),
        };
        tracing::warn!(generation = self.id, %failure, "runtime failure");
        // Closed only when the controller is gone, then nobody restarts anyway
        let _ = self.failures.send(failure);
    }
}
