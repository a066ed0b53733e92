//! Token entities for JWT-based authentication.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Numeric user identity carried in the `uid` claim
pub type UserId = u64;

/// Claim holding the user identity
pub const CLAIM_USER_ID: &str = "uid";

/// Claim holding the unique token identifier
pub const CLAIM_TOKEN_ID: &str = "jti";

/// Absolute expiry, unix seconds
pub const CLAIM_EXPIRES_AT: &str = "exp";

/// Not-before, unix seconds
pub const CLAIM_NOT_BEFORE: &str = "nbf";

/// Claims set by the issuer that callers cannot override
pub const RESERVED_CLAIMS: [&str; 3] = [CLAIM_USER_ID, CLAIM_TOKEN_ID, CLAIM_EXPIRES_AT];

/// Kind of token; each kind has its own lifetime and whitelist namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential presented on every request
    Access,
    /// Long-lived credential exchanged for a new pair
    Refresh,
}

impl TokenKind {
    /// Stable name used in store keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open mapping of claim name to value carried in a token payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Creates an empty claim set
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Adds a claim, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Inserts a claim and returns the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Looks up a claim by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether the claim is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Merges `other` into this set, skipping reserved claims
    ///
    /// Returns the names of reserved claims that were skipped.
    pub fn merge_unreserved(&mut self, other: &Map<String, Value>) -> Vec<String> {
        let mut skipped = Vec::new();
        for (name, value) in other {
            if RESERVED_CLAIMS.contains(&name.as_str()) {
                skipped.push(name.clone());
            } else {
                self.0.insert(name.clone(), value.clone());
            }
        }
        skipped
    }

    /// The `uid` claim, if it is a non-negative integer
    pub fn user_id(&self) -> Option<UserId> {
        self.0.get(CLAIM_USER_ID).and_then(Value::as_u64)
    }

    /// The `jti` claim, if it is a string
    pub fn token_id(&self) -> Option<&str> {
        self.0.get(CLAIM_TOKEN_ID).and_then(Value::as_str)
    }

    /// The `exp` claim as unix seconds
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get(CLAIM_EXPIRES_AT).and_then(Value::as_i64)
    }

    /// The `nbf` claim as unix seconds
    pub fn not_before(&self) -> Option<i64> {
        self.0.get(CLAIM_NOT_BEFORE).and_then(Value::as_i64)
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A decoded token whose signature and time claims have been verified
///
/// Only the codec constructs this type, so holding a `Token` means the raw
/// string was fully verified.
#[derive(Clone, PartialEq)]
pub struct Token {
    raw: String,
    claims: Claims,
}

impl Token {
    pub(crate) fn verified(raw: String, claims: Claims) -> Self {
        Self { raw, claims }
    }

    /// The compact wire string
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The verified payload
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Shorthand for `claims().user_id()`
    pub fn user_id(&self) -> Option<UserId> {
        self.claims.user_id()
    }

    /// Shorthand for `claims().token_id()`
    pub fn token_id(&self) -> Option<&str> {
        self.claims.token_id()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("raw", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

/// A freshly issued and whitelisted token
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Token kind
    pub kind: TokenKind,
    /// Compact wire string
    pub raw: String,
    /// The `jti` recorded in the whitelist
    pub token_id: String,
    /// Absolute expiry, unix seconds
    pub expires_at: i64,
    /// Lifetime in seconds
    pub expires_in: u64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("kind", &self.kind)
            .field("raw", &"[REDACTED]")
            .field("token_id", &self.token_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Access and refresh tokens issued together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

impl TokenPair {
    /// The access token wire string
    pub fn access_token(&self) -> &str {
        &self.access.raw
    }

    /// The refresh token wire string
    pub fn refresh_token(&self) -> &str {
        &self.refresh.raw
    }
}
