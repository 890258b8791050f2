//! The long-lived watch and restart loop.
//!
//! Each iteration runs one generation, watches what it loaded and waits
//! for the first change, runtime failure or shutdown request. The old
//! server is fully destroyed before the next one binds the same port.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use remount_graph::{
    DependencyFilter, DependencyTracker, ModuleLoader, NativeRuntime, TomlModuleLoader,
    TrackingRuntime,
};
use remount_routes::RouteSnapshot;
use tokio::sync::mpsc;

use crate::config::RemountConfig;
use crate::dev::orchestrator::{Generation, MountOrchestrator, MountOutcome, PortRequest};
use crate::dev::state::RuntimeFailure;
use crate::dev::target::TargetSpec;
use crate::dev::watcher::DependencyWatcher;
use crate::dev::DevEvent;
use crate::error::Result;
use crate::ui;

/// Why a generation is being replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadCause {
    /// A watched file changed
    Changed(PathBuf),
    /// The mounted router failed to answer a request
    RuntimeFailure(RuntimeFailure),
}

impl ReloadCause {
    pub fn path(&self) -> &Path {
        match self {
            ReloadCause::Changed(path) => path,
            ReloadCause::RuntimeFailure(failure) => &failure.path,
        }
    }
}

enum Wake {
    Reload(ReloadCause),
    Shutdown,
}

/// Runs generations until shut down.
#[derive(Debug)]
pub struct DevController {
    orchestrator: MountOrchestrator,
    target: TargetSpec,
    filter: DependencyFilter,
    preferred_port: u16,
    settle: Duration,
    failures: mpsc::UnboundedReceiver<RuntimeFailure>,
    /// Last successfully mounted snapshot; failed generations leave it alone
    last_snapshot: Option<RouteSnapshot>,
    subscribers: Vec<mpsc::UnboundedSender<DevEvent>>,
}

impl DevController {
    /// Controller loading modules from disk.
    ///
    /// The dependency tracker is created here, once, and installed in the
    /// loader's runtime for the lifetime of the process.
    pub fn new(config: &RemountConfig, target: TargetSpec) -> Result<Self> {
        let tracker = DependencyTracker::new(config.dependency_filter());
        let runtime = TrackingRuntime::new(Arc::new(NativeRuntime::new()), tracker.clone());
        let loader = TomlModuleLoader::new(Arc::new(runtime));
        Self::with_loader(config, target, Arc::new(loader), tracker)
    }

    /// Controller with a custom loader. `tracker` must observe the loader's reads.
    pub fn with_loader(
        config: &RemountConfig,
        target: TargetSpec,
        loader: Arc<dyn ModuleLoader>,
        tracker: DependencyTracker,
    ) -> Result<Self> {
        let (failures_tx, failures) = mpsc::unbounded_channel();
        let filter = tracker.filter().clone();
        let orchestrator = MountOrchestrator::new(
            target.resolved_absolute_path.clone(),
            loader,
            tracker,
            failures_tx,
        )
        .with_host(config.host_addr()?)
        .with_port_scan_limit(config.port_scan_limit)
        .with_cors(config.cors);

        Ok(Self {
            orchestrator,
            target,
            filter,
            preferred_port: config.port,
            settle: config.settle(),
            failures,
            last_snapshot: None,
            subscribers: Vec::new(),
        })
    }

    /// Receive every [`DevEvent`] from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<DevEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Run until `shutdown` resolves, then tear down and return `Ok`.
    ///
    /// # Errors
    ///
    /// Port exhaustion on the first generation, a port that cannot be
    /// rebound on a later one, or a watch that cannot be set up. The current
    /// generation is torn down before the error is returned.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut port = PortRequest::Scan(self.preferred_port);
        let mut id = 0;

        loop {
            id += 1;
            let generation = self
                .orchestrator
                .run(id, port, self.last_snapshot.as_ref())
                .await?;
            port = PortRequest::Fixed(generation.port());

            // armed before reporting, so a change right after the listing is seen
            let mut watcher = match self.watch(&generation) {
                Ok(watcher) => watcher,
                Err(err) => {
                    let closed = generation.server.destroy().await;
                    tracing::debug!(generation = id, closed, error = %err, "watch setup failed");
                    return Err(err);
                }
            };
            self.report(&generation);
            if generation.id == 1 {
                ui::print_watching(&self.target.containing_directory);
            }

            let wake = tokio::select! {
                path = next_change(&mut watcher) => Wake::Reload(ReloadCause::Changed(path)),
                failure = next_failure(&mut self.failures, id) => {
                    Wake::Reload(ReloadCause::RuntimeFailure(failure))
                }
                () = &mut shutdown => Wake::Shutdown,
            };
            // first event wins, later ones belong to the next generation
            drop(watcher);

            match wake {
                Wake::Shutdown => {
                    let closed = generation.server.destroy().await;
                    tracing::debug!(generation = id, closed, "shut down");
                    self.emit(DevEvent::Stopped);
                    return Ok(());
                }
                Wake::Reload(cause) => {
                    ui::print_reload(cause.path());
                    self.emit(DevEvent::Reloading {
                        generation: id,
                        cause,
                    });

                    if !self.settle.is_zero() {
                        tokio::time::sleep(self.settle).await;
                    }
                    let closed = generation.server.destroy().await;
                    tracing::debug!(generation = id, closed, "torn down");
                }
            }
        }
    }

    fn report(&mut self, generation: &Generation) {
        let addr = generation.server.addr();
        match &generation.outcome {
            MountOutcome::Mounted { snapshot, listing } => {
                ui::print_listing(snapshot, listing, &generation.base_url(), self.orchestrator.cors());
                self.last_snapshot = Some(snapshot.clone());
                self.emit(DevEvent::Mounted {
                    generation: generation.id,
                    addr,
                    snapshot: snapshot.clone(),
                    listing: listing.clone(),
                });
            }
            MountOutcome::Failed(err) => {
                ui::print_failure(&self.target.requested_path, err);
                self.emit(DevEvent::MountFailed {
                    generation: generation.id,
                    addr,
                    error: err.to_string(),
                });
            }
        }
    }

    /// Arm the watch for `generation`.
    fn watch(&self, generation: &Generation) -> Result<DependencyWatcher> {
        let first = generation.id == 1;
        let tree = first.then_some(self.target.containing_directory.as_path());
        let files = generation.watch_set(&self.target.resolved_absolute_path);
        DependencyWatcher::new(&files, tree, &self.filter)
    }

    fn emit(&mut self, event: DevEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

async fn next_change(watcher: &mut DependencyWatcher) -> PathBuf {
    match watcher.changed().await {
        Some(path) => path,
        // the notify callback owns the sender, so this only ends with the watcher
        None => std::future::pending().await,
    }
}

/// Next failure reported by `generation`; stale reports are dropped.
async fn next_failure(
    failures: &mut mpsc::UnboundedReceiver<RuntimeFailure>,
    generation: u64,
) -> RuntimeFailure {
    while let Some(failure) = failures.recv().await {
        if failure.generation == generation {
            return failure;
        }
        tracing::debug!(stale = failure.generation, generation, "dropping stale failure");
    }
    std::future::pending().await
}
