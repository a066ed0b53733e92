//! # Infrastructure Layer
//!
//! Concrete implementations of the core's storage contracts. The only
//! backend is Redis, used as the authoritative token whitelist.

use std::time::Duration;

use ja_core::errors::StorageError;

/// Cache module - Redis client and whitelist store
pub mod cache;

pub use cache::{RedisClient, RedisWhitelistStore};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A command did not answer within the response timeout
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for StorageError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Timeout(after) => StorageError::Timeout(after),
            other => StorageError::Unavailable(other.to_string()),
        }
    }
}
