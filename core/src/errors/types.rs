//! Error types for token verification and whitelist storage
//!
//! `TokenError` is the taxonomy every token operation reports. Storage
//! backends report `StorageError`, which the token service wraps as
//! `TokenError::StorageUnavailable` so callers can tell a backend outage
//! apart from a rejected credential.

use std::time::Duration;

use ja_shared::{error_codes, ErrorResponse};
use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token format")]
    MalformedToken,

    #[error("Invalid signature")]
    SignatureInvalid,

    #[error("Unsupported algorithm")]
    UnsupportedAlgorithm,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Missing or malformed claim: {claim}")]
    MalformedClaims { claim: &'static str },

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Token store unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("Token is empty")]
    CredentialAbsent,
}

impl TokenError {
    /// Whether the failure is a backend outage rather than a bad credential
    pub fn is_storage(&self) -> bool {
        matches!(self, TokenError::StorageUnavailable(_))
    }
}

/// Whitelist store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

impl From<TokenError> for ErrorResponse {
    fn from(error: TokenError) -> Self {
        let code = match &error {
            TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
            TokenError::TokenRevoked => error_codes::TOKEN_REVOKED,
            TokenError::CredentialAbsent => error_codes::CREDENTIAL_ABSENT,
            TokenError::StorageUnavailable(_) => error_codes::SERVICE_UNAVAILABLE,
            _ => error_codes::TOKEN_INVALID,
        };
        ErrorResponse::new(code, error.to_string())
    }
}
