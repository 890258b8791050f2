//! remount CLI - serve a router module and remount it whenever its files change.
//!
//! # Architecture
//!
//! - [`cli`] - argument parsing
//! - [`config`] - layered configuration (defaults, remount.toml, env, flags)
//! - [`dev`] - the generation lifecycle, HTTP server, watcher and controller
//! - [`error`] - error types with actionable messages
//! - [`logger`] - structured logging with tracing
//! - [`ui`] - the console protocol and status messages
//!
//! # Example
//!
//! ```rust,no_run
//! use remount_cli::config::RemountConfig;
//! use remount_cli::dev::{DevController, TargetSpec};
//!
//! # async fn run() -> remount_cli::Result<()> {
//! let config = RemountConfig::default();
//! let target = TargetSpec::resolve("mocks/", &config.index_file)?;
//! DevController::new(&config, target)?
//!     .run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{CliError, ConfigError, Result};
