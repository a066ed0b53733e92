//! Token service module for JWT management
//!
//! - `codec` signs and verifies compact tokens under a pinned algorithm
//! - `config` carries keys, lifetimes and store deadlines
//! - `service` ties the codec to a whitelist store for issue, validate,
//!   renew and revoke

mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use codec::{HeaderParams, TokenCodec, MAX_TOKEN_SIZE_BYTES};
pub use config::{TokenServiceConfig, DEFAULT_STORE_TIMEOUT};
pub use service::TokenService;
