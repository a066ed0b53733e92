//! Domain entities representing tokens and their claims.

pub mod token;


// Re-export commonly used types
pub use token::{
    Claims, IssuedToken, Token, TokenKind, TokenPair, UserId, CLAIM_EXPIRES_AT,
    CLAIM_NOT_BEFORE, CLAIM_TOKEN_ID, CLAIM_USER_ID, RESERVED_CLAIMS,
};
