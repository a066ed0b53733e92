//! Whitelist store contract for issued tokens.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::token::{TokenKind, UserId};
use crate::errors::StorageError;

/// Keyed store of live token identifiers with per-entry expiry
///
/// A token is honoured only while its entry exists. Entries are addressed by
/// `(user_id, kind, token_id)` and vanish on their own once the TTL elapses.
/// Implementations must be safe for concurrent use; no ordering is promised
/// across different keys.
#[async_trait]
pub trait WhitelistStore: Send + Sync {
    /// Create or overwrite the entry for a token
    ///
    /// # Arguments
    /// * `ttl` - Lifetime of the entry; it expires no earlier than this
    async fn record(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
        ttl: Duration,
    ) -> Result<(), StorageError>;

    /// Check whether an unexpired entry exists
    async fn exists(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError>;

    /// Delete the entry for a token
    ///
    /// # Returns
    /// * `Ok(true)` - The entry was present and has been removed
    /// * `Ok(false)` - No entry existed; deleting twice is not an error
    async fn revoke(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError>;

    /// Delete every entry belonging to a user
    ///
    /// Optional capability; stores that cannot enumerate keys keep the
    /// default, which reports `StorageError::Unsupported`.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries removed
    async fn revoke_all(&self, user_id: UserId) -> Result<usize, StorageError> {
        let _ = user_id;
        Err(StorageError::Unsupported("revoke_all"))
    }
}

#[async_trait]
impl<T: WhitelistStore + ?Sized> WhitelistStore for Arc<T> {
    async fn record(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        (**self).record(user_id, kind, token_id, ttl).await
    }

    async fn exists(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        (**self).exists(user_id, kind, token_id).await
    }

    async fn revoke(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        (**self).revoke(user_id, kind, token_id).await
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<usize, StorageError> {
        (**self).revoke_all(user_id).await
    }
}
