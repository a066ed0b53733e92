//! Redis implementation of the token whitelist store

use std::time::Duration;

use async_trait::async_trait;
use ja_core::domain::entities::token::{TokenKind, UserId};
use ja_core::errors::StorageError;
use ja_core::repositories::{KeyLayout, WhitelistStore};
use tracing::{debug, info};

use super::redis_client::RedisClient;
use super::CacheConfig;

/// Whitelist entries stored as Redis keys with a native expiry
///
/// Keys follow `{prefix}:{user_id}:{kind}:{token_id}`. The value is `1`, or
/// the key itself when `debug_values` is set so entries can be read back by
/// hand.
#[derive(Clone)]
pub struct RedisWhitelistStore {
    client: RedisClient,
    layout: KeyLayout,
    debug_values: bool,
}

impl RedisWhitelistStore {
    pub fn new(client: RedisClient, layout: KeyLayout) -> Self {
        Self {
            client,
            layout,
            debug_values: false,
        }
    }

    /// Connect to Redis and build a store from cache configuration
    pub async fn connect(config: &CacheConfig) -> Result<Self, crate::InfrastructureError> {
        let client = RedisClient::new(config).await?;
        Ok(Self::new(client, KeyLayout::new(config.key_prefix.clone()))
            .with_debug_values(config.debug_values))
    }

    pub fn with_debug_values(mut self, enabled: bool) -> Self {
        self.debug_values = enabled;
        self
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    pub(crate) fn entry_value<'a>(&self, key: &'a str) -> &'a str {
        if self.debug_values {
            key
        } else {
            "1"
        }
    }
}

#[async_trait]
impl WhitelistStore for RedisWhitelistStore {
    async fn record(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        let key = self.layout.entry_key(user_id, kind, token_id);
        self.client
            .set_with_expiry(&key, self.entry_value(&key), ttl)
            .await?;
        debug!(user_id, kind = %kind, ?ttl, "Whitelist entry recorded");
        Ok(())
    }

    async fn exists(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        let key = self.layout.entry_key(user_id, kind, token_id);
        Ok(self.client.exists(&key).await?)
    }

    async fn revoke(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        let key = self.layout.entry_key(user_id, kind, token_id);
        Ok(self.client.delete(&key).await?)
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<usize, StorageError> {
        let keys = self
            .client
            .scan_match(&self.layout.user_pattern(user_id))
            .await?;
        let removed = self.client.delete_many(keys).await?;
        info!(user_id, removed, "Whitelist entries removed for user");
        Ok(removed)
    }
}
