//! Port allocation for the first generation.

use std::net::{IpAddr, SocketAddr, TcpListener};

use crate::error::{CliError, Result};

/// Find the first bindable port in `preferred..preferred + scan_limit`.
///
/// Port 0 asks the OS for an ephemeral port, which is then used for every
/// later generation like any other.
pub fn find_available_port(host: IpAddr, preferred: u16, scan_limit: u16) -> Result<u16> {
    let end = preferred.saturating_add(scan_limit.saturating_sub(1));

    for port in preferred..=end {
        match TcpListener::bind(SocketAddr::new(host, port)) {
            Ok(listener) => {
                let port = listener.local_addr().map(|addr| addr.port()).unwrap_or(port);
                tracing::debug!(port, "found free port");
                return Ok(port);
            }
            Err(e) => tracing::debug!(port, error = %e, "port taken"),
        }
    }

    Err(CliError::PortExhausted {
        start: preferred,
        end,
    })
}
