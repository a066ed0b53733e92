//! In-process whitelist store backed by a hash map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::entities::token::{TokenKind, UserId};
use crate::errors::StorageError;

use super::key::KeyLayout;
use super::r#trait::WhitelistStore;

/// Writes between two sweeps of expired entries
pub const PURGE_EVERY_WRITES: usize = 256;

/// Whitelist store kept in memory
///
/// Entries carry a deadline and are treated as absent once it passes. They
/// are physically removed on access, by `purge_expired`, and by a sweep
/// that `record` runs every `PURGE_EVERY_WRITES` writes, so entries that are
/// never looked up again do not accumulate. Clones share the same map.
/// Suitable for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct MemoryWhitelistStore {
    entries: Arc<RwLock<HashMap<String, Instant>>>,
    writes: Arc<AtomicUsize>,
    layout: KeyLayout,
}

impl MemoryWhitelistStore {
    /// Create an empty store with the default key layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with a custom key layout
    pub fn with_layout(layout: KeyLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Number of unexpired entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|deadline| **deadline > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove expired entries and return how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, deadline| *deadline > now);
        before - entries.len()
    }
}

#[async_trait]
impl WhitelistStore for MemoryWhitelistStore {
    async fn record(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        let key = self.layout.entry_key(user_id, kind, token_id);
        let now = Instant::now();
        let deadline = now
            .checked_add(ttl)
            .ok_or_else(|| StorageError::Unavailable(format!("ttl out of range: {:?}", ttl)))?;

        let mut entries = self.entries.write().await;
        entries.insert(key, deadline);
        let written = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if written % PURGE_EVERY_WRITES == 0 {
            let before = entries.len();
            entries.retain(|_, deadline| *deadline > now);
            debug!(dropped = before - entries.len(), "Purged expired whitelist entries");
        }
        Ok(())
    }

    async fn exists(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        let key = self.layout.entry_key(user_id, kind, token_id);
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return Ok(false),
                Some(deadline) if *deadline > now => return Ok(true),
                Some(_) => {}
            }
        }

        // Expired: drop it unless it was re-recorded in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(&key).is_some_and(|deadline| *deadline <= now) {
            entries.remove(&key);
        }
        Ok(false)
    }

    async fn revoke(
        &self,
        user_id: UserId,
        kind: TokenKind,
        token_id: &str,
    ) -> Result<bool, StorageError> {
        let key = self.layout.entry_key(user_id, kind, token_id);
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Ok(matches!(entries.remove(&key), Some(deadline) if deadline > now))
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<usize, StorageError> {
        let prefix = self.layout.user_prefix(user_id);
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let mut removed = 0;
        entries.retain(|key, deadline| {
            if key.starts_with(&prefix) {
                if *deadline > now {
                    removed += 1;
                }
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
