//! Configuration Module
//!
//! Handles loading the cache service configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{CacheOptions, DEFAULT_BACKEND, DEFAULT_PREFIX, DEFAULT_TTL};

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend opened by the service
    pub backend: String,
    /// Record directory for the file backend
    pub directory: PathBuf,
    /// Record lifetime in seconds
    pub ttl: u64,
    /// Key prefix for keyed-store backends
    pub prefix: String,
    /// HTTP server port
    pub server_port: u16,
    /// Shared store purge interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - Backend name (default: file)
    /// - `CACHE_DIRECTORY` - File backend directory (default: `<tmp>/koi-cache`)
    /// - `CACHE_TTL` - Record lifetime in seconds (default: 3600)
    /// - `CACHE_PREFIX` - Keyed-store prefix (default: koi_)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env::var("CACHE_BACKEND")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.backend),
            directory: env::var_os("CACHE_DIRECTORY")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.directory),
            ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl),
            prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.prefix),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Options handed to the selected backend.
    ///
    /// Every cache option is passed along; each backend ignores the ones it
    /// does not declare.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions::new()
            .with("directory", self.directory.to_string_lossy().into_owned())
            .with("ttl", self.ttl)
            .with("prefix", self.prefix.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            directory: env::temp_dir().join("koi-cache"),
            ttl: DEFAULT_TTL,
            prefix: DEFAULT_PREFIX.to_string(),
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}
