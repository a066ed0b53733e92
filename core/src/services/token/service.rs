//! Main token service implementation

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use rand::RngCore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{
    Claims, IssuedToken, Token, TokenKind, TokenPair, UserId, CLAIM_EXPIRES_AT, CLAIM_TOKEN_ID,
    CLAIM_USER_ID,
};
use crate::errors::{DomainError, StorageError, TokenError};
use crate::repositories::WhitelistStore;

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;

/// Random bytes behind each token identifier (128 bits)
const TOKEN_ID_BYTES: usize = 16;

/// Service issuing, validating and renewing whitelisted JWT pairs
///
/// Holds no mutable state of its own; every call may run concurrently and
/// all blocking happens inside the whitelist store, bounded by
/// `TokenServiceConfig::store_timeout`.
pub struct TokenService<S: WhitelistStore> {
    store: S,
    codec: TokenCodec,
    config: TokenServiceConfig,
    cancellation: CancellationToken,
}

impl<S: WhitelistStore> TokenService<S> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `store` - Whitelist store tracking live token identifiers
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService` or a configuration error if the secret is empty,
    /// the algorithm is not an HMAC variant, or a lifetime or the leeway is
    /// out of range
    pub fn new(store: S, config: TokenServiceConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let codec = TokenCodec::new(&config.secret_key, config.algorithm, config.leeway)?;

        Ok(Self {
            store,
            codec,
            config,
            cancellation: CancellationToken::new(),
        })
    }

    /// Abort outstanding store calls once `token` is cancelled
    ///
    /// Calls made after cancellation fail immediately with
    /// `StorageUnavailable(Cancelled)`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issues a token and records it in the whitelist
    ///
    /// Configured default claims are applied first, then `extra`; `uid`,
    /// `jti` and `exp` are always set by the service.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - Token signed and whitelisted
    /// * `Err(TokenError::StorageUnavailable)` - The whitelist entry could not
    ///   be written; the token is discarded
    pub async fn issue(
        &self,
        user_id: UserId,
        kind: TokenKind,
        extra: Claims,
    ) -> Result<IssuedToken, TokenError> {
        if user_id == 0 {
            return Err(TokenError::MalformedClaims {
                claim: CLAIM_USER_ID,
            });
        }

        let token_id = generate_token_id();
        let lifetime = self.config.duration(kind);
        let (expires_at, ttl) = self.expiry(lifetime)?;

        let mut claims = Claims::new();
        claims.merge_unreserved(&self.config.additional_claims);
        let ignored = claims.merge_unreserved(extra.as_map());
        if !ignored.is_empty() {
            debug!(?ignored, "Ignoring reserved claims supplied by caller");
        }
        claims.insert(CLAIM_USER_ID, user_id);
        claims.insert(CLAIM_TOKEN_ID, token_id.clone());
        claims.insert(CLAIM_EXPIRES_AT, expires_at);

        let raw = self.codec.encode(&claims, None)?;

        self.guarded("record", self.store.record(user_id, kind, &token_id, ttl))
            .await
            .map_err(|e| {
                error!(
                    user_id,
                    kind = %kind,
                    error = %e,
                    "Failed to whitelist issued token"
                );
                TokenError::from(e)
            })?;

        info!(
            user_id,
            kind = %kind,
            token_id = short_id(&token_id),
            "Token issued"
        );

        Ok(IssuedToken {
            kind,
            raw,
            token_id,
            expires_at,
            expires_in: lifetime.as_secs(),
        })
    }

    /// Issues a refresh token followed by an access token
    pub async fn issue_pair(&self, user_id: UserId, extra: Claims) -> Result<TokenPair, TokenError> {
        let refresh = self.issue(user_id, TokenKind::Refresh, extra.clone()).await?;
        let access = self.issue(user_id, TokenKind::Access, extra).await?;
        Ok(TokenPair { access, refresh })
    }

    /// Verifies a token and, optionally, its whitelist entry
    ///
    /// Codec failures are returned unchanged. A store failure during the
    /// whitelist check is returned as `StorageUnavailable`, never skipped.
    pub async fn validate(
        &self,
        raw: &str,
        kind: TokenKind,
        check_whitelist: bool,
    ) -> Result<Token, TokenError> {
        let token = self.codec.decode(raw)?;
        if !check_whitelist {
            return Ok(token);
        }

        let (user_id, token_id) = identity_claims(&token)?;

        let live = self
            .guarded("exists", self.store.exists(user_id, kind, token_id))
            .await?;
        if !live {
            debug!(
                user_id,
                kind = %kind,
                token_id = short_id(token_id),
                "Token not in whitelist"
            );
            return Err(TokenError::TokenRevoked);
        }

        Ok(token)
    }

    /// Exchanges a refresh token for a new pair, revoking the old one
    ///
    /// The old entry is revoked before anything new is recorded. A store
    /// failure during that revoke is logged and does not block the renewal.
    /// With `exclusive_renewal`, a renewal that finds the entry already gone
    /// lost a race with a concurrent renewal and fails `TokenRevoked`.
    pub async fn renew(&self, refresh_raw: &str) -> Result<TokenPair, TokenError> {
        let old = self.validate(refresh_raw, TokenKind::Refresh, true).await?;
        let (user_id, old_id) = identity_claims(&old)?;

        match self
            .guarded("revoke", self.store.revoke(user_id, TokenKind::Refresh, old_id))
            .await
        {
            Ok(true) => {}
            Ok(false) if self.config.exclusive_renewal => {
                warn!(
                    user_id,
                    token_id = short_id(old_id),
                    "Refresh token already consumed by a concurrent renewal"
                );
                return Err(TokenError::TokenRevoked);
            }
            Ok(false) => {
                warn!(
                    user_id,
                    token_id = short_id(old_id),
                    "Refresh token entry vanished before revocation"
                );
            }
            Err(e) => {
                warn!(
                    user_id,
                    token_id = short_id(old_id),
                    error = %e,
                    "Failed to revoke old refresh token, continuing renewal"
                );
            }
        }

        let refresh = self.issue(user_id, TokenKind::Refresh, Claims::new()).await?;
        let access = self.issue(user_id, TokenKind::Access, Claims::new()).await?;

        info!(user_id, "Token pair renewed");
        Ok(TokenPair { access, refresh })
    }

    /// Removes a whitelist entry
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The token was live and is now revoked
    /// * `Ok(false)` - Nothing to revoke; not an error
    pub async fn revoke(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, TokenError> {
        let removed = self
            .guarded("revoke", self.store.revoke(user_id, kind, token_id))
            .await?;
        debug!(
            user_id,
            kind = %kind,
            token_id = short_id(token_id),
            removed,
            "Token revoked"
        );
        Ok(removed)
    }

    /// Revokes the whitelist entry of an already validated token
    pub async fn revoke_token(&self, token: &Token, kind: TokenKind) -> Result<bool, TokenError> {
        let (user_id, token_id) = identity_claims(token)?;
        self.revoke(user_id, kind, token_id).await
    }

    /// Ends a session by revoking its access token and, if given, its refresh token
    ///
    /// Both tokens must verify cryptographically; their whitelist entries
    /// may already be gone. A refresh token belonging to another user is
    /// rejected with `MalformedClaims`.
    ///
    /// # Returns
    ///
    /// Number of whitelist entries actually removed
    pub async fn logout(
        &self,
        access_raw: &str,
        refresh_raw: Option<&str>,
    ) -> Result<usize, TokenError> {
        let access = self.validate(access_raw, TokenKind::Access, false).await?;
        let (user_id, _) = identity_claims(&access)?;

        let refresh = match refresh_raw {
            Some(raw) => {
                let refresh = self.validate(raw, TokenKind::Refresh, false).await?;
                let (owner, _) = identity_claims(&refresh)?;
                if owner != user_id {
                    warn!(user_id, owner, "Logout with a refresh token of another user");
                    return Err(TokenError::MalformedClaims {
                        claim: CLAIM_USER_ID,
                    });
                }
                Some(refresh)
            }
            None => None,
        };

        let mut removed = usize::from(self.revoke_token(&access, TokenKind::Access).await?);
        if let Some(refresh) = &refresh {
            removed += usize::from(self.revoke_token(refresh, TokenKind::Refresh).await?);
        }

        info!(user_id, removed, "Session logged out");
        Ok(removed)
    }

    /// Revokes every token of a user, where the store supports enumeration
    pub async fn revoke_all_for_user(&self, user_id: UserId) -> Result<usize, TokenError> {
        let removed = self
            .guarded("revoke_all", self.store.revoke_all(user_id))
            .await?;
        info!(user_id, removed, "Revoked all tokens for user");
        Ok(removed)
    }

    /// Absolute `exp` and whitelist TTL (lifetime plus leeway) for a new token
    fn expiry(&self, lifetime: Duration) -> Result<(i64, Duration), TokenError> {
        let out_of_range = || {
            error!(?lifetime, leeway = self.config.leeway, "Token expiry out of range");
            TokenError::MalformedClaims {
                claim: CLAIM_EXPIRES_AT,
            }
        };

        let expires_at = i64::try_from(lifetime.as_secs())
            .ok()
            .and_then(|secs| Utc::now().timestamp().checked_add(secs))
            .ok_or_else(out_of_range)?;
        let ttl = lifetime
            .checked_add(Duration::from_secs(self.config.leeway))
            .ok_or_else(out_of_range)?;
        Ok((expires_at, ttl))
    }

    /// Runs a store call under the configured deadline and cancellation token
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        let deadline = self.config.store_timeout;

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => {
                debug!(operation, "Whitelist store call cancelled");
                Err(StorageError::Cancelled)
            }
            result = tokio::time::timeout(deadline, call) => match result {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(operation, ?deadline, "Whitelist store call timed out");
                    Err(StorageError::Timeout(deadline))
                }
            },
        }
    }
}

/// Both identity claims, required before any whitelist lookup
fn identity_claims(token: &Token) -> Result<(UserId, &str), TokenError> {
    let user_id = token
        .user_id()
        .filter(|id| *id != 0)
        .ok_or(TokenError::MalformedClaims {
            claim: CLAIM_USER_ID,
        })?;
    let token_id = token
        .token_id()
        .filter(|id| !id.is_empty())
        .ok_or(TokenError::MalformedClaims {
            claim: CLAIM_TOKEN_ID,
        })?;
    Ok((user_id, token_id))
}

/// 128-bit random identifier, hex encoded
fn generate_token_id() -> String {
    let mut bytes = [0u8; TOKEN_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Leading characters of a token id, enough to correlate log lines
fn short_id(token_id: &str) -> &str {
    token_id.get(..8).unwrap_or(token_id)
}
