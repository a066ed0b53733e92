//! Business services containing domain logic and use cases.

pub mod token;

// Re-export commonly used types
pub use token::{
    HeaderParams, TokenCodec, TokenService, TokenServiceConfig, DEFAULT_STORE_TIMEOUT,
    MAX_TOKEN_SIZE_BYTES,
};
