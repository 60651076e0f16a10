//! Configuration module for the route request engine

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default number of concurrent response parsing jobs
pub const DEFAULT_PARSING_WORKERS: usize = 2;

/// Router configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Access token appended to route request URLs
    pub access_token: Option<String>,

    /// Maximum number of responses parsed at the same time
    pub parsing_workers: usize,

    /// Request timeout handed to the native router
    pub request_timeout: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            parsing_workers: DEFAULT_PARSING_WORKERS,
            request_timeout: None,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Invalid values are logged and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = RouterConfig::default();

        // Access token
        if let Some(token) = lookup("NAVROUTE_ACCESS_TOKEN") {
            let token = token.trim();
            if !token.is_empty() {
                config.access_token = Some(token.to_string());
            }
        }

        // Parsing workers
        if let Some(workers) = lookup("NAVROUTE_PARSING_WORKERS") {
            match workers.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => config.parsing_workers = workers,
                _ => warn!(value = %workers, "Ignoring invalid NAVROUTE_PARSING_WORKERS"),
            }
        }

        // Request timeout
        if let Some(timeout) = lookup("NAVROUTE_REQUEST_TIMEOUT_MS") {
            match timeout.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.request_timeout = Some(Duration::from_millis(ms)),
                _ => warn!(value = %timeout, "Ignoring invalid NAVROUTE_REQUEST_TIMEOUT_MS"),
            }
        }

        config
    }
}
