//! Rate limiter configuration.

use serde::{Deserialize, Serialize};

/// Sliding-window rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is applied to media routes.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum requests per client key within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    /// Window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Minimum interval between sweeps of emptied keys, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> usize {
    100
}

fn default_window() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}
