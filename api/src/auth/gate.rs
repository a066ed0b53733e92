//! Bearer-token gate in front of protected resources

use std::fmt;
use std::sync::Arc;

use ja_core::domain::entities::token::{Claims, Token, UserId};
use ja_core::errors::TokenError;
use ja_shared::{error_codes, BearerConfig};
use tracing::{debug, error};

use super::credentials::{BearerExtractor, CredentialSource};
use super::verifier::TokenServiceWrapper;

/// Authenticated caller, injected into request extensions
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// User identity from the `uid` claim
    pub user_id: UserId,
    /// Token identifier from the `jti` claim
    pub token_id: String,
    token: Token,
}

impl Identity {
    fn from_token(token: Token) -> Option<Self> {
        let user_id = token.user_id()?;
        let token_id = token.token_id()?.to_string();
        Some(Self {
            user_id,
            token_id,
            token,
        })
    }

    pub fn claims(&self) -> &Claims {
        self.token.claims()
    }

    /// The access token the caller presented
    pub fn raw_token(&self) -> &str {
        self.token.raw()
    }
}

/// Why a presented credential was refused
///
/// Each reason maps to one fixed description; error internals never reach
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidFormat,
    Expired,
    NotYetValid,
    BadClaims,
    Revoked,
    Unavailable,
}

impl RejectReason {
    pub fn description(&self) -> &'static str {
        match self {
            RejectReason::InvalidFormat => "Invalid token format",
            RejectReason::Expired => "Token expired",
            RejectReason::NotYetValid => "Token is not yet valid",
            RejectReason::BadClaims => "Bad token format",
            RejectReason::Revoked => "Token no longer exists",
            RejectReason::Unavailable => "The access token invalid or expired",
        }
    }
}

impl From<&TokenError> for RejectReason {
    fn from(error: &TokenError) -> Self {
        match error {
            TokenError::MalformedToken
            | TokenError::SignatureInvalid
            | TokenError::UnsupportedAlgorithm => RejectReason::InvalidFormat,
            TokenError::TokenExpired => RejectReason::Expired,
            TokenError::TokenNotYetValid => RejectReason::NotYetValid,
            TokenError::MalformedClaims { .. } | TokenError::CredentialAbsent => {
                RejectReason::BadClaims
            }
            TokenError::TokenRevoked => RejectReason::Revoked,
            TokenError::StorageUnavailable(_) => RejectReason::Unavailable,
        }
    }
}

/// Outcome of a failed authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No bearer credential in the request
    CredentialAbsent,
    /// A credential was supplied and refused
    Rejected(RejectReason),
}

impl AuthFailure {
    /// Human-readable reason for the challenge header
    pub fn description(&self) -> &'static str {
        match self {
            AuthFailure::CredentialAbsent => "Token is empty",
            AuthFailure::Rejected(reason) => reason.description(),
        }
    }

    /// Error code for the JSON body
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthFailure::CredentialAbsent => error_codes::CREDENTIAL_ABSENT,
            AuthFailure::Rejected(RejectReason::Expired) => error_codes::TOKEN_EXPIRED,
            AuthFailure::Rejected(RejectReason::Revoked) => error_codes::TOKEN_REVOKED,
            AuthFailure::Rejected(RejectReason::Unavailable) => error_codes::UNAUTHORIZED,
            AuthFailure::Rejected(_) => error_codes::TOKEN_INVALID,
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Verifies bearer tokens on behalf of the HTTP layer
#[derive(Clone)]
pub struct AuthGate {
    service: Arc<dyn TokenServiceWrapper>,
    extractor: BearerExtractor,
    realm: String,
}

impl AuthGate {
    /// Build a gate; fails only if the configured header pattern is not a valid regex
    pub fn new(
        service: Arc<dyn TokenServiceWrapper>,
        config: &BearerConfig,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            service,
            extractor: BearerExtractor::new(config)?,
            realm: config.realm.clone(),
        })
    }

    pub fn service(&self) -> &Arc<dyn TokenServiceWrapper> {
        &self.service
    }

    pub fn extractor(&self) -> &BearerExtractor {
        &self.extractor
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Validate a raw access token against the whitelist
    pub async fn authenticate(&self, raw: &str) -> Result<Identity, AuthFailure> {
        if raw.trim().is_empty() {
            return Err(AuthFailure::CredentialAbsent);
        }

        let token = self.service.validate_access(raw).await.map_err(|e| {
            if e.is_storage() {
                error!(error = %e, "Token store unavailable while authenticating request");
            } else {
                debug!(error = %e, "Access token rejected");
            }
            AuthFailure::Rejected(RejectReason::from(&e))
        })?;

        Identity::from_token(token).ok_or(AuthFailure::Rejected(RejectReason::BadClaims))
    }

    /// Locate the bearer credential in a request and authenticate it
    pub async fn authenticate_request<S>(&self, source: &S) -> Result<Identity, AuthFailure>
    where
        S: CredentialSource + ?Sized,
    {
        let raw = self
            .extractor
            .extract(source)
            .map(str::to_owned)
            .ok_or(AuthFailure::CredentialAbsent)?;
        self.authenticate(&raw).await
    }

    /// Value of the `WWW-Authenticate` header for a failure
    pub fn challenge(&self, failure: &AuthFailure) -> String {
        format!(
            "Bearer realm=\"{}\", error=\"invalid_token\", error_description=\"{}\"",
            self.realm,
            failure.description()
        )
    }
}
