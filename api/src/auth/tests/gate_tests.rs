//! Unit tests for the authentication gate

use std::sync::Arc;
use std::time::Duration;

use actix_web::test::TestRequest;
use async_trait::async_trait;
use ja_core::domain::entities::token::{Claims, TokenKind, UserId};
use ja_core::errors::{StorageError, TokenError};
use ja_core::repositories::{MemoryWhitelistStore, WhitelistStore};
use ja_core::services::token::{TokenService, TokenServiceConfig};
use ja_shared::BearerConfig;

use crate::auth::gate::{AuthFailure, AuthGate, RejectReason};

fn setup() -> (Arc<TokenService<MemoryWhitelistStore>>, AuthGate) {
    let service = Arc::new(
        TokenService::new(
            MemoryWhitelistStore::new(),
            TokenServiceConfig::new("gate-test-secret"),
        )
        .unwrap(),
    );
    let gate = AuthGate::new(service.clone(), &BearerConfig::default()).unwrap();
    (service, gate)
}

#[actix_rt::test]
async fn test_authenticate_valid_token() {
    let (service, gate) = setup();
    let issued = service
        .issue(42, TokenKind::Access, Claims::new().with("role", "admin"))
        .await
        .unwrap();

    let identity = gate.authenticate(&issued.raw).await.unwrap();
    assert_eq!(identity.user_id, 42);
    assert_eq!(identity.token_id, issued.token_id);
    assert_eq!(identity.raw_token(), issued.raw);
    assert_eq!(
        identity.claims().get("role"),
        Some(&serde_json::json!("admin"))
    );
}

#[actix_rt::test]
async fn test_authenticate_request_reads_header() {
    let (service, gate) = setup();
    let issued = service
        .issue(7, TokenKind::Access, Claims::new())
        .await
        .unwrap();

    let req = TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", issued.raw)))
        .to_http_request();
    assert_eq!(gate.authenticate_request(&req).await.unwrap().user_id, 7);

    let req = TestRequest::default().to_http_request();
    assert_eq!(
        gate.authenticate_request(&req).await,
        Err(AuthFailure::CredentialAbsent)
    );
}

#[actix_rt::test]
async fn test_revoked_token_rejected() {
    let (service, gate) = setup();
    let issued = service
        .issue(9, TokenKind::Access, Claims::new())
        .await
        .unwrap();
    service
        .store()
        .revoke(9, TokenKind::Access, &issued.token_id)
        .await
        .unwrap();

    let failure = gate.authenticate(&issued.raw).await.unwrap_err();
    assert_eq!(failure, AuthFailure::Rejected(RejectReason::Revoked));
    assert_eq!(failure.description(), "Token no longer exists");
}

#[actix_rt::test]
async fn test_refresh_token_is_not_an_access_token() {
    let (service, gate) = setup();
    let issued = service
        .issue(9, TokenKind::Refresh, Claims::new())
        .await
        .unwrap();
    assert_eq!(
        gate.authenticate(&issued.raw).await,
        Err(AuthFailure::Rejected(RejectReason::Revoked))
    );
}

#[actix_rt::test]
async fn test_garbage_and_empty_tokens() {
    let (_, gate) = setup();
    assert_eq!(
        gate.authenticate("not.a.jwt").await,
        Err(AuthFailure::Rejected(RejectReason::InvalidFormat))
    );
    assert_eq!(gate.authenticate("  ").await, Err(AuthFailure::CredentialAbsent));
}

#[test]
fn test_reason_mapping() {
    let cases = [
        (TokenError::MalformedToken, "Invalid token format"),
        (TokenError::SignatureInvalid, "Invalid token format"),
        (TokenError::UnsupportedAlgorithm, "Invalid token format"),
        (TokenError::TokenExpired, "Token expired"),
        (TokenError::TokenNotYetValid, "Token is not yet valid"),
        (TokenError::MalformedClaims { claim: "jti" }, "Bad token format"),
        (TokenError::TokenRevoked, "Token no longer exists"),
        (
            TokenError::StorageUnavailable(StorageError::Unavailable("refused".to_string())),
            "The access token invalid or expired",
        ),
    ];
    for (error, expected) in cases {
        assert_eq!(RejectReason::from(&error).description(), expected);
    }
}

#[test]
fn test_challenge_header() {
    let (_, gate) = setup();
    assert_eq!(
        gate.challenge(&AuthFailure::Rejected(RejectReason::Expired)),
        r#"Bearer realm="api", error="invalid_token", error_description="Token expired""#
    );
    assert_eq!(
        gate.challenge(&AuthFailure::CredentialAbsent),
        r#"Bearer realm="api", error="invalid_token", error_description="Token is empty""#
    );
}

/// Store whose backend refuses every call
struct UnreachableStore;

#[async_trait]
impl WhitelistStore for UnreachableStore {
    async fn record(
        &self,
        _user_id: UserId,
        _kind: TokenKind,
        _token_id: &str,
        _ttl: Duration,
    ) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }

    async fn exists(
        &self,
        _user_id: UserId,
        _kind: TokenKind,
        _token_id: &str,
    ) -> Result<bool, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }

    async fn revoke(
        &self,
        _user_id: UserId,
        _kind: TokenKind,
        _token_id: &str,
    ) -> Result<bool, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }
}

#[actix_rt::test]
async fn test_unreachable_store_rejects_valid_token() {
    let (issuer, _) = setup();
    let issued = issuer
        .issue(42, TokenKind::Access, Claims::new())
        .await
        .unwrap();

    let down = Arc::new(
        TokenService::new(
            UnreachableStore,
            TokenServiceConfig::new("gate-test-secret"),
        )
        .unwrap(),
    );
    let gate = AuthGate::new(down, &BearerConfig::default()).unwrap();

    let failure = gate.authenticate(&issued.raw).await.unwrap_err();
    assert_eq!(failure, AuthFailure::Rejected(RejectReason::Unavailable));
    assert_eq!(failure.description(), "The access token invalid or expired");
    assert_eq!(failure.error_code(), "UNAUTHORIZED");
}
