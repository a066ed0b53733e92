//! Domain-specific error types and error handling.

mod types;


pub use types::{StorageError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<ja_shared::ConfigError> for DomainError {
    fn from(error: ja_shared::ConfigError) -> Self {
        DomainError::Configuration {
            message: error.to_string(),
        }
    }
}
