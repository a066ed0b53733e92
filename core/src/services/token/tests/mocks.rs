//! Whitelist store doubles for exercising failure paths

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::token::{TokenKind, UserId};
use crate::errors::StorageError;
use crate::repositories::{MemoryWhitelistStore, WhitelistStore};

/// Memory-backed store whose individual operations can be made to fail
#[derive(Clone, Default)]
pub struct ScriptedStore {
    pub inner: MemoryWhitelistStore,
    pub fail_record: bool,
    pub fail_exists: bool,
    pub fail_revoke: bool,
    /// Report every revoke as "already absent" without touching the entry
    pub revoke_reports_absent: bool,
    /// Sleep before answering any call
    pub delay: Option<Duration>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn unavailable() -> StorageError {
    StorageError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl WhitelistStore for ScriptedStore {
    async fn record(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        self.pause().await;
        if self.fail_record {
            return Err(unavailable());
        }
        self.inner.record(user_id, kind, token_id, ttl).await
    }

    async fn exists(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        self.pause().await;
        if self.fail_exists {
            return Err(unavailable());
        }
        self.inner.exists(user_id, kind, token_id).await
    }

    async fn revoke(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        self.pause().await;
        if self.fail_revoke {
            return Err(unavailable());
        }
        if self.revoke_reports_absent {
            return Ok(false);
        }
        self.inner.revoke(user_id, kind, token_id).await
    }
}
