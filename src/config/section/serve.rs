//! `[serve]` section configuration.
//!
//! Contains HTTP server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5277                 # HTTP port number
//! threads = 4                 # Request worker threads
//! cache_control = "public, max-age=31536000, immutable"
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.
//! Set `cache_control = ""` to omit the header.

use crate::serve::IMMUTABLE;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Number of request worker threads.
    pub threads: usize,

    /// `Cache-Control` sent with served assets.
    pub cache_control: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5277,
            threads: 4,
            cache_control: IMMUTABLE.to_string(),
        }
    }
}
