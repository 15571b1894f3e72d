//! Network availability checks.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Reports whether the device currently has network access.
///
/// Best-effort: a positive answer does not guarantee the forecast endpoint
/// itself is reachable.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity check backed by a short TCP connect to a well-known address.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

impl Connectivity for TcpProbe {
    fn is_online(&self) -> bool {
        let addrs = match self.addr.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!("Probe resolution failed for {}: {}", self.addr, e);
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }
        tracing::debug!("Probe could not connect to {}", self.addr);
        false
    }
}
