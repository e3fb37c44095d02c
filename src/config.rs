//! Relay settings.
//!
//! Every value is baked in. [`RelayConfig::default`] is what the binary runs
//! with; the struct exists so tests can build the same relay against a local
//! mock upstream.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Base URL every forwarded path is appended to. No trailing slash: request
/// targets always start with `/`.
pub const UPSTREAM_BASE: &str = "https://s600zdn3-3000.uks1.devtunnels.ms";

/// Port the relay listens on, on all interfaces.
pub const LISTEN_PORT: u16 = 8000;

/// Upper bound on one upstream fetch, connect through last body byte.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub listen: SocketAddr,
    pub upstream_base: String,
    pub upstream_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, LISTEN_PORT)),
            upstream_base: UPSTREAM_BASE.to_owned(),
            upstream_timeout: UPSTREAM_TIMEOUT,
        }
    }
}
