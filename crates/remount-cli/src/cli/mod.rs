//! Command-line interface definition for remount.
//!
//! ```text
//! remount [OPTIONS] <TARGET>
//! ```


use clap::Parser;
use std::path::PathBuf;

use crate::config::CliOverrides;

/// remount - hot-reloading dev server for router modules
#[derive(Parser, Debug)]
#[command(
    name = "remount",
    version,
    about = "Serve a router module and remount it whenever its files change",
    long_about = "remount loads a TOML router module, serves it over HTTP and watches every\n\
                  file the module pulls in. On a change the server is torn down, the module\n\
                  is reloaded on the same port, and the route changes are printed."
)]
pub struct Cli {
    /// Entry module file, or a directory containing routes.toml
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Preferred port [default: 5000]
    ///
    /// The first free port at or above this one is used. Later reloads keep
    /// the port that was picked.
    #[arg(short, long, env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Bind address [default: 127.0.0.1]
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Config file [default: remount.toml beside the target]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level, including requests)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress diagnostics except errors
    ///
    /// The route listing and reload lines are still printed.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Flags that override configuration files and environment variables.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host.clone(),
            port: self.port,
        }
    }
}
