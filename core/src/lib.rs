//! # JwtAuth Core
//!
//! Token lifecycle for JWT access/refresh pairs with server-side revocation.
//! This crate contains the token entities, the error taxonomy, the whitelist
//! store contract with an in-memory implementation, the signing codec and the
//! token service that ties them together.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claims, IssuedToken, Token, TokenKind, TokenPair, UserId, CLAIM_EXPIRES_AT,
    CLAIM_NOT_BEFORE, CLAIM_TOKEN_ID, CLAIM_USER_ID, RESERVED_CLAIMS,
};
pub use errors::{DomainError, StorageError, TokenError};
pub use repositories::{KeyLayout, MemoryWhitelistStore, WhitelistStore};
pub use services::{
    HeaderParams, TokenCodec, TokenService, TokenServiceConfig, DEFAULT_STORE_TIMEOUT,
    MAX_TOKEN_SIZE_BYTES,
};
