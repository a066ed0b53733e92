//! Shared configuration and response types for the jwtauth workspace
//!
//! This crate provides the pieces every layer agrees on:
//! - Configuration types (JWT, bearer extraction, refresh transport, cache, logging)
//! - Error response structures returned by the HTTP layer

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, BearerConfig, CacheConfig, ConfigError, Environment, JwtConfig,
    LogFormat, LoggingConfig, RefreshConfig, RefreshTransport, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
