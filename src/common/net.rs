//! Network utility functions

use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use super::error::{PanelError, Result};

/// Parse a socket address
///
/// Accepts literal addresses first and falls back to name resolution
/// (`localhost:8080`).
pub fn parse_socket_addr(addr: &str) -> Result<SocketAddr> {
    if let Ok(socket_addr) = SocketAddr::from_str(addr) {
        return Ok(socket_addr);
    }

    match addr.to_socket_addrs() {
        Ok(mut addrs) => {
            if let Some(addr) = addrs.next() {
                Ok(addr)
            } else {
                Err(PanelError::Config(format!("Failed to parse address: {}", addr)))
            }
        }
        Err(e) => Err(PanelError::Config(format!("Failed to parse address {}: {}", addr, e))),
    }
}

/// Build the console listen address from a port setting
pub fn listen_on_port(port: &str) -> Result<SocketAddr> {
    let port: u16 = port
        .trim()
        .parse()
        .map_err(|_| PanelError::Config(format!("Invalid panel port: {}", port)))?;
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}
