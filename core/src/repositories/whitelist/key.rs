//! Key layout shared by every whitelist backend.

use crate::domain::entities::token::{TokenKind, UserId};

/// Default namespace for whitelist keys
pub const DEFAULT_KEY_PREFIX: &str = "api:token";

/// Builds store keys of the form `{prefix}:{user_id}:{kind}:{token_id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    prefix: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeyLayout {
    /// Create a layout with the given namespace; a trailing `:` is dropped
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with(':') {
            prefix.pop();
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key addressing a single token
    pub fn entry_key(&self, user_id: UserId, kind: TokenKind, token_id: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, user_id, kind.as_str(), token_id)
    }

    /// Common prefix of every key owned by a user, including the separator
    pub fn user_prefix(&self, user_id: UserId) -> String {
        format!("{}:{}:", self.prefix, user_id)
    }

    /// Glob pattern matching every key owned by a user
    pub fn user_pattern(&self, user_id: UserId) -> String {
        format!("{}*", self.user_prefix(user_id))
    }
}
