//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_SECS;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for cached reads
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds
    pub sweep_interval: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Cache TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60, 0 falls back to default)
    pub fn from_env() -> Self {
        let sweep_interval = match env_or("SWEEP_INTERVAL", DEFAULT_SWEEP_INTERVAL_SECS) {
            0 => DEFAULT_SWEEP_INTERVAL_SECS,
            secs => secs,
        };

        Self {
            default_ttl: env_or("DEFAULT_TTL", DEFAULT_TTL_SECS),
            server_port: env_or("SERVER_PORT", DEFAULT_PORT),
            sweep_interval,
        }
    }

    pub fn sweep_every(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
            server_port: DEFAULT_PORT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}
