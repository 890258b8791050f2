//! Error handling for the remount CLI.
//!
//! Errors are split by how the dev loop treats them:
//! - **Fatal** errors (`CliError`) end the process with exit code 1. They
//!   cover bad targets and configuration, port allocation and watch setup.
//! - **Recovered** errors never surface here. Mount failures are
//!   `remount_graph::LoadError`s printed by the controller, and request
//!   failures are reported as [`RuntimeFailure`](crate::dev::RuntimeFailure)s
//!   that trigger a restart.

mod diagnostic;

pub use diagnostic::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (bad file, invalid values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The target passed on the command line does not exist
    #[error("Target not found: {}\n\nHint: Pass a module file or a directory containing {index_file}", .path.display())]
    TargetNotFound {
        /// Path as given by the user
        path: PathBuf,
        /// Module file looked up inside directory targets
        index_file: String,
    },

    /// Every port in the scan window is taken
    #[error("No free port between {start} and {end}\n\nHint: Pass --port <PORT> or raise port_scan_limit")]
    PortExhausted {
        /// First port probed
        start: u16,
        /// Last port probed
        end: u16,
    },

    /// A port that should be free could not be bound
    #[error("Port {port} is unavailable: {source}")]
    PortUnavailable {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dependency watch could not be set up
    #[error("File watcher error: {0}\n\nHint: On Linux, raise fs.inotify.max_user_watches")]
    Watch(#[from] notify::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create remount.toml next to the target or drop --config", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
