//! Authentication and token lifecycle configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ConfigError;

/// Algorithms the signing key can be used with (shared-secret HMAC only)
pub const SUPPORTED_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Upper bound for token lifetimes and leeway, in seconds (100 years)
pub const MAX_LIFETIME_SECONDS: u64 = 3_155_760_000;

/// JWT signing and lifetime configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key used to sign and verify tokens
    pub secret_key: String,

    /// Signing algorithm (default: HS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_duration")]
    pub access_duration: u64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_duration")]
    pub refresh_duration: u64,

    /// Clock skew tolerance applied to `exp` and `nbf`, in seconds
    #[serde(default)]
    pub leeway_seconds: u64,

    /// Claims merged into every issued token
    #[serde(default)]
    pub additional_claims: Map<String, Value>,

    /// Fail a renewal when the old refresh token was already consumed
    #[serde(default = "default_exclusive_renewal")]
    pub exclusive_renewal: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            algorithm: default_algorithm(),
            access_duration: default_access_duration(),
            refresh_duration: default_refresh_duration(),
            leeway_seconds: 0,
            additional_claims: Map::new(),
            exclusive_renewal: default_exclusive_renewal(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret_key: std::env::var("JWT_SECRET").unwrap_or_default(),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            access_duration: std::env::var("JWT_ACCESS_DURATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_duration),
            refresh_duration: std::env::var("JWT_REFRESH_DURATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_duration),
            leeway_seconds: std::env::var("JWT_LEEWAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            additional_claims: Map::new(),
            exclusive_renewal: std::env::var("JWT_EXCLUSIVE_RENEWAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.exclusive_renewal),
        }
    }

    /// Set access token lifetime in seconds
    pub fn with_access_duration(mut self, seconds: u64) -> Self {
        self.access_duration = seconds;
        self
    }

    /// Set refresh token lifetime in seconds
    pub fn with_refresh_duration(mut self, seconds: u64) -> Self {
        self.refresh_duration = seconds;
        self
    }

    /// Set the clock skew leeway in seconds
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Add a claim merged into every issued token
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_claims.insert(name.into(), value.into());
        self
    }

    /// Check the configuration can be used to sign tokens
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "secret_key",
            });
        }
        if !SUPPORTED_ALGORITHMS.contains(&self.algorithm.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "algorithm",
                value: self.algorithm.clone(),
            });
        }
        for (field, seconds) in [
            ("access_duration", self.access_duration),
            ("refresh_duration", self.refresh_duration),
        ] {
            if seconds == 0 || seconds > MAX_LIFETIME_SECONDS {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: seconds.to_string(),
                });
            }
        }
        if self.leeway_seconds > MAX_LIFETIME_SECONDS {
            return Err(ConfigError::InvalidValue {
                field: "leeway_seconds",
                value: self.leeway_seconds.to_string(),
            });
        }
        Ok(())
    }
}

/// Bearer credential extraction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BearerConfig {
    /// HTTP header carrying the access token
    #[serde(default = "default_header")]
    pub header: String,

    /// Pattern applied to the header value; the first capture group is the token.
    /// `None` uses the whole header value.
    #[serde(default = "default_pattern")]
    pub pattern: Option<String>,

    /// Realm reported in the `WWW-Authenticate` challenge
    #[serde(default = "default_realm")]
    pub realm: String,
}

impl Default for BearerConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            pattern: default_pattern(),
            realm: default_realm(),
        }
    }
}

impl BearerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            header: std::env::var("BEARER_HEADER").unwrap_or_else(|_| default_header()),
            pattern: std::env::var("BEARER_PATTERN").ok().or_else(default_pattern),
            realm: std::env::var("AUTH_REALM").unwrap_or_else(|_| default_realm()),
        }
    }
}

/// Where a refresh token travels in a renewal request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum RefreshTransport {
    /// A field of the request body
    Body(String),
    /// A dedicated request header
    Header(String),
}

impl Default for RefreshTransport {
    fn default() -> Self {
        RefreshTransport::Body(String::from("refresh_token"))
    }
}

/// Refresh endpoint configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Transport used to read the refresh token
    #[serde(default)]
    pub transport: RefreshTransport,
}

impl RefreshConfig {
    /// Read the refresh token from a body field
    pub fn body(field: impl Into<String>) -> Self {
        Self {
            transport: RefreshTransport::Body(field.into()),
        }
    }

    /// Read the refresh token from a request header
    pub fn header(name: impl Into<String>) -> Self {
        Self {
            transport: RefreshTransport::Header(name.into()),
        }
    }

    /// Create from environment variables
    ///
    /// `REFRESH_TRANSPORT` is `body` (default) or `header`; `REFRESH_FIELD`
    /// overrides the field or header name.
    pub fn from_env() -> Self {
        let field = std::env::var("REFRESH_FIELD").ok();
        match std::env::var("REFRESH_TRANSPORT").as_deref() {
            Ok("header") => {
                Self::header(field.unwrap_or_else(|| String::from("Authorization-Refresh")))
            }
            _ => Self::body(field.unwrap_or_else(|| String::from("refresh_token"))),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Bearer extraction configuration
    #[serde(default)]
    pub bearer: BearerConfig,

    /// Refresh endpoint configuration
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            bearer: BearerConfig::from_env(),
            refresh: RefreshConfig::from_env(),
        }
    }
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_access_duration() -> u64 {
    1800 // 30 minutes
}

fn default_refresh_duration() -> u64 {
    1_296_000 // 15 days
}

fn default_exclusive_renewal() -> bool {
    true
}

fn default_header() -> String {
    String::from("Authorization")
}

fn default_pattern() -> Option<String> {
    Some(String::from(r"^Bearer\s+(.*?)$"))
}

fn default_realm() -> String {
    String::from("api")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_duration, 1800);
        assert_eq!(config.refresh_duration, 1_296_000);
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.leeway_seconds, 0);
        assert!(config.exclusive_renewal);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = JwtConfig::default();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingValue {
                field: "secret_key"
            })
        );
    }

    #[test]
    fn test_asymmetric_algorithm_rejected() {
        let mut config = JwtConfig::new("secret");
        config.algorithm = "RS256".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "algorithm", .. })
        ));
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_duration(60)
            .with_refresh_duration(3600)
            .with_leeway(5)
            .with_claim("iss", "api");

        assert!(config.validate().is_ok());
        assert_eq!(config.access_duration, 60);
        assert_eq!(config.refresh_duration, 3600);
        assert_eq!(config.leeway_seconds, 5);
        assert_eq!(config.additional_claims.get("iss"), Some(&Value::from("api")));
    }

    #[test]
    fn test_out_of_range_lifetimes_rejected() {
        let config = JwtConfig::new("secret").with_leeway(u64::MAX);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "leeway_seconds",
                value: u64::MAX.to_string(),
            })
        );

        let config = JwtConfig::new("secret").with_access_duration(u64::MAX / 2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "access_duration", .. })
        ));

        let config = JwtConfig::new("secret").with_refresh_duration(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "refresh_duration", .. })
        ));

        let config = JwtConfig::new("secret")
            .with_access_duration(MAX_LIFETIME_SECONDS)
            .with_leeway(MAX_LIFETIME_SECONDS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bearer_config_default() {
        let config = BearerConfig::default();
        assert_eq!(config.header, "Authorization");
        assert_eq!(config.pattern.as_deref(), Some(r"^Bearer\s+(.*?)$"));
        assert_eq!(config.realm, "api");
    }

    #[test]
    fn test_refresh_transport_deserialize() {
        let config: RefreshConfig =
            serde_json::from_str(r#"{"transport":{"type":"header","name":"X-Refresh"}}"#)
                .unwrap();
        assert_eq!(
            config.transport,
            RefreshTransport::Header("X-Refresh".to_string())
        );

        let config: RefreshConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(
            config.transport,
            RefreshTransport::Body("refresh_token".to_string())
        );
    }
}
