//! Configuration for the remount dev loop.
//!
//! Merges settings from defaults, `remount.toml`, `REMOUNT_*` environment
//! variables and CLI flags, in that order of increasing priority.

mod defaults;
mod loading;
mod validation;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use remount_graph::DependencyFilter;

pub use defaults::*;
pub use loading::{CliOverrides, CONFIG_FILE_NAME};

/// remount configuration, loaded from remount.toml or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemountConfig {
    /// Bind address
    pub host: String,

    /// Preferred port; the first free port at or above it is used
    pub port: u16,

    /// Module file looked up when the target is a directory
    pub index_file: String,

    /// Directory names whose contents are never watched
    pub vendor_dirs: Vec<String>,

    /// Extra roots whose contents are never watched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_roots: Vec<PathBuf>,

    /// Pause after a change before restarting, in milliseconds
    pub settle_ms: u64,

    /// How many ports to probe, starting at `port`
    pub port_scan_limit: u16,

    /// Answer cross-origin requests
    pub cors: bool,
}

impl Default for RemountConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            index_file: default_index_file(),
            vendor_dirs: default_vendor_dirs(),
            exclude_roots: Vec::new(),
            settle_ms: DEFAULT_SETTLE_MS,
            port_scan_limit: DEFAULT_PORT_SCAN_LIMIT,
            cors: true,
        }
    }
}

impl RemountConfig {
    /// Parsed bind address. `localhost` means the IPv4 loopback.
    pub fn host_addr(&self) -> Result<IpAddr, crate::error::ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        self.host
            .parse()
            .map_err(|_| crate::error::ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: "Use an IP address such as 127.0.0.1 or 0.0.0.0".to_string(),
            })
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Which files the dependency tracker ignores.
    ///
    /// The installation directory of the running binary is always excluded.
    pub fn dependency_filter(&self) -> DependencyFilter {
        let mut roots = DependencyFilter::default().excluded_roots().to_vec();
        roots.extend(self.exclude_roots.iter().cloned());
        DependencyFilter::new(roots, self.vendor_dirs.clone())
    }
}
