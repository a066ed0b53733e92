//! Signing and verification of compact JWT strings.

use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use crate::domain::entities::token::{Claims, Token};
use crate::errors::{DomainError, TokenError};

/// Upper bound on the size of a token accepted for decoding
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Optional fields placed in the JOSE header at encode time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderParams {
    /// Key identifier (`kid`)
    pub key_id: Option<String>,
    /// Content type (`cty`)
    pub content_type: Option<String>,
}

/// Stateless codec pinned to one HMAC algorithm and secret
///
/// The algorithm is taken from configuration, never from the token. A token
/// whose header names any other algorithm is rejected before its signature
/// is looked at.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec for a shared secret
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC key; must not be empty
    /// * `algorithm` - One of HS256, HS384, HS512
    /// * `leeway` - Clock skew tolerance in seconds for `exp` and `nbf`
    pub fn new(secret: &str, algorithm: Algorithm, leeway: u64) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::Configuration {
                message: "signing secret must not be empty".to_string(),
            });
        }
        if algorithm_name(algorithm).is_none() {
            return Err(DomainError::Configuration {
                message: format!("unsupported signing algorithm {:?}", algorithm),
            });
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = leeway;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        // exp is optional on decode; issued tokens always carry it
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn leeway(&self) -> u64 {
        self.validation.leeway
    }

    /// Serializes and signs a claim set
    pub fn encode(
        &self,
        claims: &Claims,
        params: Option<&HeaderParams>,
    ) -> Result<String, TokenError> {
        let mut header = Header::new(self.algorithm);
        if let Some(params) = params {
            header.kid = params.key_id.clone();
            header.cty = params.content_type.clone();
        }

        encode(&header, claims.as_map(), &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            TokenError::MalformedToken
        })
    }

    /// Verifies structure, algorithm, signature and time claims
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Fully verified token
    /// * `Err(TokenError)` - One of `MalformedToken`, `UnsupportedAlgorithm`,
    ///   `SignatureInvalid`, `TokenExpired`, `TokenNotYetValid`
    pub fn decode(&self, raw: &str) -> Result<Token, TokenError> {
        self.inspect_header(raw)?;

        let data = decode::<Map<String, Value>>(raw, &self.decoding_key, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?;

        Ok(Token::verified(raw.to_string(), Claims::from(data.claims)))
    }

    /// Structural checks and algorithm pinning ahead of signature verification
    fn inspect_header(&self, raw: &str) -> Result<(), TokenError> {
        if raw.is_empty() || raw.len() > MAX_TOKEN_SIZE_BYTES {
            return Err(TokenError::MalformedToken);
        }

        let mut segments = raw.split('.');
        let header = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(payload), Some(_), None) if !header.is_empty() && !payload.is_empty() => {
                header
            }
            _ => return Err(TokenError::MalformedToken),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::MalformedToken)?;
        let header: Value =
            serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedToken)?;

        let alg = header
            .get("alg")
            .and_then(Value::as_str)
            .ok_or(TokenError::MalformedToken)?;

        if Some(alg) != algorithm_name(self.algorithm) {
            tracing::debug!(header_alg = alg, "Rejecting token signed with unexpected algorithm");
            return Err(TokenError::UnsupportedAlgorithm);
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

/// Header name of the HMAC algorithms the codec supports
fn algorithm_name(algorithm: Algorithm) -> Option<&'static str> {
    match algorithm {
        Algorithm::HS256 => Some("HS256"),
        Algorithm::HS384 => Some("HS384"),
        Algorithm::HS512 => Some("HS512"),
        _ => None,
    }
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => TokenError::UnsupportedAlgorithm,
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
        _ => TokenError::MalformedToken,
    }
}
