//! Object-safe view of the token service for the HTTP layer

use async_trait::async_trait;
use ja_core::domain::entities::token::{Token, TokenKind, TokenPair};
use ja_core::errors::TokenError;
use ja_core::repositories::WhitelistStore;
use ja_core::services::token::TokenService;

/// Trait for wrapping TokenService to allow dynamic dispatch
///
/// Lets handlers and middleware hold `Arc<dyn TokenServiceWrapper>` without
/// naming the whitelist store type.
#[async_trait]
pub trait TokenServiceWrapper: Send + Sync {
    /// Verify an access token against signature, expiry and whitelist
    async fn validate_access(&self, raw: &str) -> Result<Token, TokenError>;

    /// Exchange a refresh token for a new pair
    async fn renew(&self, refresh_raw: &str) -> Result<TokenPair, TokenError>;

    /// Revoke a session's access token and optionally its refresh token
    async fn logout(&self, access_raw: &str, refresh_raw: Option<&str>)
        -> Result<usize, TokenError>;
}

/// Implementation of TokenServiceWrapper for any TokenService
#[async_trait]
impl<S> TokenServiceWrapper for TokenService<S>
where
    S: WhitelistStore + 'static,
{
    async fn validate_access(&self, raw: &str) -> Result<Token, TokenError> {
        self.validate(raw, TokenKind::Access, true).await
    }

    async fn renew(&self, refresh_raw: &str) -> Result<TokenPair, TokenError> {
        TokenService::renew(self, refresh_raw).await
    }

    async fn logout(
        &self,
        access_raw: &str,
        refresh_raw: Option<&str>,
    ) -> Result<usize, TokenError> {
        TokenService::logout(self, access_raw, refresh_raw).await
    }
}
