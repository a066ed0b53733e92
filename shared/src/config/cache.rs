//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Redis configuration for the token whitelist
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection attempts before giving up at startup
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Response timeout for a single store call, in milliseconds
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Prefix for whitelist keys (`{prefix}:{user}:{kind}:{token}`)
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Store the full key as the entry value instead of `1`
    #[serde(default)]
    pub debug_values: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connect_retries: default_connect_retries(),
            response_timeout_ms: default_response_timeout_ms(),
            key_prefix: default_key_prefix(),
            debug_values: false,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let response_timeout_ms = std::env::var("REDIS_RESPONSE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_response_timeout_ms);
        let key_prefix =
            std::env::var("TOKEN_KEY_PREFIX").unwrap_or_else(|_| default_key_prefix());

        Self {
            url,
            response_timeout_ms,
            key_prefix,
            ..Default::default()
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for whitelist keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Response timeout as a duration
    pub fn response_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.response_timeout_ms)
    }
}

fn default_connect_retries() -> u32 {
    3
}

fn default_response_timeout_ms() -> u64 {
    2000
}

fn default_key_prefix() -> String {
    String::from("api:token")
}
