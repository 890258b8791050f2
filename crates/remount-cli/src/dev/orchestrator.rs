//! Lifecycle of a single generation.
//!
//! ```text
//! AllocatingPort -> Listening -> Mounting -> Mounted     -> ReadyForWatch
//!                                         \-> MountFailed -/
//! ```
//!
//! A mount failure is an outcome, not an error: the server stays up with
//! the fallback response and the files read so far are still handed off.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use remount_graph::{DependencySet, DependencyTracker, LoadError, ModuleLoader};
use remount_routes::{compare, extract_routes, Listing, RouteSnapshot};
use tokio::sync::mpsc;

use crate::config::DEFAULT_PORT_SCAN_LIMIT;
use crate::dev::port::find_available_port;
use crate::dev::server::GenerationServer;
use crate::dev::state::{GenerationState, RuntimeFailure};
use crate::dev::base_url;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AllocatingPort,
    Listening,
    Mounting,
    Mounted,
    MountFailed,
    ReadyForWatch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::AllocatingPort => "allocating-port",
            Phase::Listening => "listening",
            Phase::Mounting => "mounting",
            Phase::Mounted => "mounted",
            Phase::MountFailed => "mount-failed",
            Phase::ReadyForWatch => "ready-for-watch",
        })
    }
}

/// Which port a generation listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRequest {
    /// Probe upward from this port (first generation)
    Scan(u16),
    /// Bind exactly this port (port already owned by the dev loop)
    Fixed(u16),
}

#[derive(Debug)]
pub enum MountOutcome {
    Mounted {
        snapshot: RouteSnapshot,
        listing: Listing,
    },
    Failed(LoadError),
}

impl MountOutcome {
    pub fn is_mounted(&self) -> bool {
        matches!(self, MountOutcome::Mounted { .. })
    }

    pub fn snapshot(&self) -> Option<&RouteSnapshot> {
        match self {
            MountOutcome::Mounted { snapshot, .. } => Some(snapshot),
            MountOutcome::Failed(_) => None,
        }
    }
}

/// A listening server with its mount result, owned by the controller until
/// superseded.
#[derive(Debug)]
pub struct Generation {
    pub id: u64,
    pub server: GenerationServer,
    pub outcome: MountOutcome,
    pub dependencies: DependencySet,
}

impl Generation {
    pub fn port(&self) -> u16 {
        self.server.addr().port()
    }

    pub fn base_url(&self) -> String {
        base_url(self.server.addr())
    }

    /// Files whose change should start the next generation.
    ///
    /// Besides the recorded dependencies this includes the entry module and,
    /// after a failed read, the missing file, so creating either one reloads.
    pub fn watch_set(&self, entry: &Path) -> DependencySet {
        let mut files = self.dependencies.clone();
        files.insert(entry.to_path_buf());
        if let MountOutcome::Failed(LoadError::Read { path, .. }) = &self.outcome
            && path.is_absolute()
        {
            files.insert(path.clone());
        }
        files
    }
}

/// Runs generations against one entry module.
#[derive(Debug)]
pub struct MountOrchestrator {
    entry: PathBuf,
    host: IpAddr,
    port_scan_limit: u16,
    cors: bool,
    loader: Arc<dyn ModuleLoader>,
    tracker: DependencyTracker,
    failures: mpsc::UnboundedSender<RuntimeFailure>,
}

impl MountOrchestrator {
    /// `tracker` must be the one installed in the loader's runtime.
    pub fn new(
        entry: impl Into<PathBuf>,
        loader: Arc<dyn ModuleLoader>,
        tracker: DependencyTracker,
        failures: mpsc::UnboundedSender<RuntimeFailure>,
    ) -> Self {
        Self {
            entry: entry.into(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port_scan_limit: DEFAULT_PORT_SCAN_LIMIT,
            cors: true,
            loader,
            tracker,
            failures,
        }
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port_scan_limit(mut self, limit: u16) -> Self {
        self.port_scan_limit = limit;
        self
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    pub fn entry(&self) -> &Path {
        &self.entry
    }

    pub fn cors(&self) -> bool {
        self.cors
    }

    /// Run generation `id` up to `ReadyForWatch`.
    ///
    /// `previous` is the last successfully mounted snapshot; the listing of
    /// a successful mount is computed against it.
    ///
    /// # Errors
    ///
    /// Only port problems are errors. A failed mount is reported in
    /// [`Generation::outcome`].
    pub async fn run(
        &self,
        id: u64,
        port: PortRequest,
        previous: Option<&RouteSnapshot>,
    ) -> Result<Generation> {
        transition(id, Phase::AllocatingPort);
        let port = match port {
            PortRequest::Scan(preferred) => {
                find_available_port(self.host, preferred, self.port_scan_limit)?
            }
            PortRequest::Fixed(port) => port,
        };

        transition(id, Phase::Listening);
        let state = GenerationState::new(id, self.failures.clone());
        let server =
            GenerationServer::bind(SocketAddr::new(self.host, port), Arc::clone(&state), self.cors)
                .await?;

        transition(id, Phase::Mounting);
        let tracking = self.tracker.begin_tracking();
        let outcome = match self.loader.load(&self.entry).await {
            Ok(tree) => {
                let snapshot = extract_routes(&tree, &base_url(server.addr()));
                let listing = compare(previous, &snapshot);
                state.mount(tree);
                transition(id, Phase::Mounted);
                tracing::debug!(generation = id, routes = snapshot.len(), "router installed");
                MountOutcome::Mounted { snapshot, listing }
            }
            Err(err) => {
                state.fail(err.to_string());
                transition(id, Phase::MountFailed);
                tracing::debug!(generation = id, error = %err, "mount failed");
                MountOutcome::Failed(err)
            }
        };

        let dependencies = tracking.recorded_files();
        transition(id, Phase::ReadyForWatch);
        tracing::debug!(generation = id, files = dependencies.len(), "dependencies recorded");

        Ok(Generation {
            id,
            server,
            outcome,
            dependencies,
        })
    }
}

fn transition(generation: u64, phase: Phase) {
    tracing::debug!(generation, %phase, "generation phase");
}
