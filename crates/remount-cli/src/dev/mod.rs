//! The dev loop: serve a router module and remount it on change.
//!
//! - [`DevController`] runs generations back to back until Ctrl-C
//! - [`MountOrchestrator`] takes one generation from port allocation to
//!   a mounted (or failed) router
//! - [`GenerationServer`] is the HTTP side, with a [`ConnectionRegistry`]
//!   so teardown can force-close keep-alive connections
//! - [`DependencyWatcher`] turns file changes into reloads

pub mod controller;
pub mod orchestrator;
pub mod port;
pub mod registry;
pub mod server;
pub mod state;
pub mod target;
pub mod watcher;

// Re-exports
pub use controller::{DevController, ReloadCause};
pub use orchestrator::{Generation, MountOrchestrator, MountOutcome, Phase, PortRequest};
pub use port::find_available_port;
pub use registry::ConnectionRegistry;
pub use server::GenerationServer;
pub use state::{GenerationState, MountStatus, RuntimeFailure, SharedState, FALLBACK_TEXT};
pub use target::TargetSpec;
pub use watcher::DependencyWatcher;

use remount_routes::{Listing, RouteSnapshot};
use std::net::{IpAddr, SocketAddr};

/// Events in the dev loop lifecycle
#[derive(Debug, Clone)]
pub enum DevEvent {
    /// A generation mounted its router
    Mounted {
        generation: u64,
        addr: SocketAddr,
        snapshot: RouteSnapshot,
        listing: Listing,
    },

    /// A generation is listening but its module failed to load
    MountFailed {
        generation: u64,
        addr: SocketAddr,
        error: String,
    },

    /// A generation is being torn down for a restart
    Reloading { generation: u64, cause: ReloadCause },

    /// The loop ended after a shutdown request
    Stopped,
}

/// URL printed in listings; loopback and wildcard binds show as `localhost`.
pub fn base_url(addr: SocketAddr) -> String {
    let host = match addr.ip() {
        ip if ip.is_loopback() || ip.is_unspecified() => "localhost".to_string(),
        IpAddr::V6(ip) => format!("[{ip}]"),
        IpAddr::V4(ip) => ip.to_string(),
    };
    format!("http://{host}:{}", addr.port())
}
