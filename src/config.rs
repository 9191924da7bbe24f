//! Configuration Module
//!
//! Loads the host configuration from environment variables.

use std::env;

use crate::cache::DEFAULT_TTL;

/// Host configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache endpoint URI; the scheme selects the backend
    pub cache_endpoint: String,
    /// Cache TTL in seconds; non-positive values fall back to 7 days
    pub cache_ttl: i64,
    /// Bound on each cache call, in milliseconds
    pub cache_timeout_ms: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENDPOINT` - Cache endpoint URI (default: `local://`)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 604800)
    /// - `CACHE_TIMEOUT_MS` - Per-call cache timeout (default: 1000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_endpoint: env::var("CACHE_ENDPOINT").unwrap_or(defaults.cache_endpoint),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl),
            cache_timeout_ms: env::var("CACHE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_timeout_ms),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_endpoint: "local://".to_string(),
            cache_ttl: DEFAULT_TTL as i64,
            cache_timeout_ms: 1000,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_endpoint, "local://");
        assert_eq!(config.cache_ttl, 604_800);
        assert_eq!(config.cache_timeout_ms, 1000);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("CACHE_ENDPOINT");
        env::remove_var("CACHE_TTL");
        env::remove_var("CACHE_TIMEOUT_MS");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.cache_endpoint, "local://");
        assert_eq!(config.cache_ttl, 604_800);
        assert_eq!(config.cache_timeout_ms, 1000);
        assert_eq!(config.server_port, 3000);
    }
}
