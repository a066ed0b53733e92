//! Configuration for the token service

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use ja_shared::config::auth::MAX_LIFETIME_SECONDS;
use ja_shared::JwtConfig;
use serde_json::{Map, Value};

use crate::domain::entities::token::TokenKind;
use crate::errors::DomainError;

/// Default bound on a single whitelist store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for the token service
///
/// Read-only once the service is built.
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// HMAC signing secret
    pub secret_key: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime
    pub access_duration: Duration,
    /// Refresh token lifetime
    pub refresh_duration: Duration,
    /// Clock skew tolerance in seconds
    pub leeway: u64,
    /// Claims merged into every issued token
    pub additional_claims: Map<String, Value>,
    /// Fail a renewal whose refresh entry was already removed by another call
    pub exclusive_renewal: bool,
    /// Deadline for each whitelist store call
    pub store_timeout: Duration,
}

impl TokenServiceConfig {
    /// HS256 configuration with default lifetimes (30 minutes / 15 days)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            algorithm: Algorithm::HS256,
            access_duration: Duration::from_secs(1800),
            refresh_duration: Duration::from_secs(1_296_000),
            leeway: 0,
            additional_claims: Map::new(),
            exclusive_renewal: true,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Build from the shared JWT configuration
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let algorithm =
            Algorithm::from_str(&config.algorithm).map_err(|_| DomainError::Configuration {
                message: format!("unknown algorithm {}", config.algorithm),
            })?;

        Ok(Self {
            secret_key: config.secret_key.clone(),
            algorithm,
            access_duration: Duration::from_secs(config.access_duration),
            refresh_duration: Duration::from_secs(config.refresh_duration),
            leeway: config.leeway_seconds,
            additional_claims: config.additional_claims.clone(),
            exclusive_renewal: config.exclusive_renewal,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        })
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_claims.insert(name.into(), value.into());
        self
    }

    /// Check lifetimes and leeway are usable for `exp` and whitelist TTLs
    ///
    /// Both lifetimes must be non-zero and, like the leeway, at most
    /// `MAX_LIFETIME_SECONDS`.
    pub fn validate(&self) -> Result<(), DomainError> {
        let max = Duration::from_secs(MAX_LIFETIME_SECONDS);
        for (field, lifetime) in [
            ("access_duration", self.access_duration),
            ("refresh_duration", self.refresh_duration),
        ] {
            if lifetime.is_zero() || lifetime > max {
                return Err(DomainError::Configuration {
                    message: format!("{} out of range: {:?}", field, lifetime),
                });
            }
        }
        if self.leeway > MAX_LIFETIME_SECONDS {
            return Err(DomainError::Configuration {
                message: format!("leeway out of range: {}s", self.leeway),
            });
        }
        Ok(())
    }

    /// Lifetime of a token of the given kind
    pub fn duration(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_duration,
            TokenKind::Refresh => self.refresh_duration,
        }
    }
}

impl std::fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("secret_key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("access_duration", &self.access_duration)
            .field("refresh_duration", &self.refresh_duration)
            .field("leeway", &self.leeway)
            .field("additional_claims", &self.additional_claims)
            .field("exclusive_renewal", &self.exclusive_renewal)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}
