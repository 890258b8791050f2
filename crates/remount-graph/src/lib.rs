//! # remount-graph
//!
//! Module loading and dependency tracking for mounted routers.
//!
//! A router module is a TOML file describing a routing stack. Modules can
//! mount other module files and embed fixture files as response bodies, so
//! loading one is a multi-file operation. Every file the loader opens goes
//! through a [`Runtime`]; wrapping that runtime in a [`TrackingRuntime`]
//! records the files a mount pass depended on.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   read_file   ┌──────────────────┐
//! │ TomlModuleLoader │──────────────▶│ TrackingRuntime  │──▶ DependencyTracker
//! │  (ModuleLoader)  │               │  (decorator)     │
//! └────────┬─────────┘               └────────┬─────────┘
//!          │                                  │
//!          ▼                                  ▼
//!    RoutingTree                       NativeRuntime (fs)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use remount_graph::{
//!     DependencyFilter, DependencyTracker, ModuleLoader, NativeRuntime, TomlModuleLoader,
//!     TrackingRuntime,
//! };
//!
//! # async fn run() -> Result<(), remount_graph::LoadError> {
//! let tracker = DependencyTracker::new(DependencyFilter::default());
//! let runtime = TrackingRuntime::new(Arc::new(NativeRuntime::new()), tracker.clone());
//! let loader = TomlModuleLoader::new(Arc::new(runtime));
//!
//! let handle = tracker.begin_tracking();
//! let tree = loader.load(Path::new("/srv/mock/routes.toml")).await?;
//! println!("{} routes, {} files", tree.route_count(), handle.recorded_files().len());
//! # Ok(())
//! # }
//! ```

pub mod runtime;

mod error;
mod loader;
mod module;
mod tracker;


pub use error::{LoadError, Result};
pub use loader::{ModuleLoader, TomlModuleLoader};
pub use module::{ModuleFile, StackEntry};
pub use runtime::{NativeRuntime, Runtime, RuntimeError, RuntimeResult};
pub use tracker::{
    DependencyFilter, DependencySet, DependencyTracker, TrackingHandle, TrackingRuntime,
    DEFAULT_VENDOR_DIRS,
};

/// Content type for a file body, guessed from its extension.
pub fn content_type_for(path: &std::path::Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}
