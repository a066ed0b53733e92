//! Request and response bodies of the auth endpoints

use serde::{Deserialize, Serialize};

use ja_core::domain::entities::token::TokenPair;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            expires_in: pair.access.expires_in,
            access_token: pair.access.raw,
            refresh_token: pair.refresh.raw,
            token_type: String::from("Bearer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub user_id: u64,
    pub token_id: String,
    pub claims: serde_json::Map<String, serde_json::Value>,
}
