//! Unit tests for the token codec

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::Algorithm;
use serde_json::json;

use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, TokenError};
use crate::services::token::{HeaderParams, TokenCodec, MAX_TOKEN_SIZE_BYTES};

const SECRET: &str = "codec-test-secret";

fn codec() -> TokenCodec {
    TokenCodec::new(SECRET, Algorithm::HS256, 0).unwrap()
}

fn claims_expiring_in(seconds: i64) -> Claims {
    Claims::new()
        .with("uid", 42u64)
        .with("jti", "0123456789abcdef0123456789abcdef")
        .with("exp", Utc::now().timestamp() + seconds)
}

/// Swap the header segment of a compact token, keeping payload and signature
fn with_header(raw: &str, header: serde_json::Value) -> String {
    let mut parts = raw.splitn(2, '.');
    let _ = parts.next();
    let rest = parts.next().unwrap();
    let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
    format!("{}.{}", encoded, rest)
}

#[test]
fn test_round_trip_preserves_claims() {
    let codec = codec();
    let claims = claims_expiring_in(600).with("role", "admin").with("scopes", json!(["a", "b"]));

    let raw = codec.encode(&claims, None).unwrap();
    assert_eq!(raw.split('.').count(), 3);

    let token = codec.decode(&raw).unwrap();
    assert_eq!(token.raw(), raw);
    assert_eq!(token.claims(), &claims);
    assert_eq!(token.user_id(), Some(42));
    assert_eq!(token.token_id(), Some("0123456789abcdef0123456789abcdef"));
}

#[test]
fn test_expired_token_rejected() {
    let codec = codec();
    let raw = codec.encode(&claims_expiring_in(-1), None).unwrap();
    assert_eq!(codec.decode(&raw).unwrap_err(), TokenError::TokenExpired);
}

#[test]
fn test_leeway_absorbs_clock_skew() {
    let codec = TokenCodec::new(SECRET, Algorithm::HS256, 60).unwrap();
    assert_eq!(codec.leeway(), 60);

    let within = codec.encode(&claims_expiring_in(-30), None).unwrap();
    assert!(codec.decode(&within).is_ok());

    let beyond = codec.encode(&claims_expiring_in(-61), None).unwrap();
    assert_eq!(codec.decode(&beyond).unwrap_err(), TokenError::TokenExpired);
}

#[test]
fn test_not_before_enforced_with_leeway() {
    let claims = claims_expiring_in(600).with("nbf", Utc::now().timestamp() + 100);

    let strict = codec();
    let raw = strict.encode(&claims, None).unwrap();
    assert_eq!(strict.decode(&raw).unwrap_err(), TokenError::TokenNotYetValid);

    let lenient = TokenCodec::new(SECRET, Algorithm::HS256, 200).unwrap();
    assert!(lenient.decode(&raw).is_ok());
}

#[test]
fn test_token_without_exp_accepted() {
    let codec = codec();
    let raw = codec
        .encode(&Claims::new().with("uid", 1u64).with("jti", "x"), None)
        .unwrap();
    assert!(codec.decode(&raw).is_ok());
}

#[test]
fn test_wrong_secret_is_signature_failure() {
    let other = TokenCodec::new("another-secret", Algorithm::HS256, 0).unwrap();
    let raw = other.encode(&claims_expiring_in(600), None).unwrap();
    assert_eq!(codec().decode(&raw).unwrap_err(), TokenError::SignatureInvalid);
}

#[test]
fn test_tampered_payload_is_signature_failure() {
    let codec = codec();
    let raw = codec.encode(&claims_expiring_in(600), None).unwrap();
    let parts: Vec<&str> = raw.split('.').collect();
    let forged_payload = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&claims_expiring_in(600).with("uid", 1u64)).unwrap(),
    );
    let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
    assert_eq!(codec.decode(&forged).unwrap_err(), TokenError::SignatureInvalid);
}

#[test]
fn test_algorithm_is_pinned() {
    let hs512 = TokenCodec::new(SECRET, Algorithm::HS512, 0).unwrap();
    let raw = hs512.encode(&claims_expiring_in(600), None).unwrap();

    // Header honestly says HS512
    assert_eq!(codec().decode(&raw).unwrap_err(), TokenError::UnsupportedAlgorithm);

    // Header lies and claims HS256; the HS512 signature cannot verify under HS256
    let relabelled = with_header(&raw, json!({"alg": "HS256", "typ": "JWT"}));
    assert_eq!(codec().decode(&relabelled).unwrap_err(), TokenError::SignatureInvalid);
}

#[test]
fn test_unsigned_token_rejected() {
    let raw = codec().encode(&claims_expiring_in(600), None).unwrap();
    let unsigned = with_header(&raw, json!({"alg": "none", "typ": "JWT"}));
    let stripped = format!("{}.", unsigned.rsplitn(2, '.').nth(1).unwrap());

    assert_eq!(codec().decode(&stripped).unwrap_err(), TokenError::UnsupportedAlgorithm);
}

#[test]
fn test_structurally_invalid_tokens() {
    let codec = codec();
    for raw in ["", "abc", "a.b", "a.b.c.d", ".payload.sig", "!!!.e30.sig"] {
        assert_eq!(
            codec.decode(raw).unwrap_err(),
            TokenError::MalformedToken,
            "input {:?}",
            raw
        );
    }

    let header_without_alg = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT"}"#);
    let raw = format!("{}.e30.c2ln", header_without_alg);
    assert_eq!(codec.decode(&raw).unwrap_err(), TokenError::MalformedToken);
}

#[test]
fn test_oversized_token_rejected() {
    let raw = "a".repeat(MAX_TOKEN_SIZE_BYTES + 1);
    assert_eq!(codec().decode(&raw).unwrap_err(), TokenError::MalformedToken);
}

#[test]
fn test_header_params_written() {
    let codec = codec();
    let params = HeaderParams {
        key_id: Some("key-2024".to_string()),
        content_type: None,
    };
    let raw = codec.encode(&claims_expiring_in(600), Some(&params)).unwrap();

    let header = jsonwebtoken::decode_header(&raw).unwrap();
    assert_eq!(header.kid.as_deref(), Some("key-2024"));
    assert_eq!(header.alg, Algorithm::HS256);
    assert!(codec.decode(&raw).is_ok());
}

#[test]
fn test_construction_rejects_bad_configuration() {
    assert!(matches!(
        TokenCodec::new("", Algorithm::HS256, 0),
        Err(DomainError::Configuration { .. })
    ));
    assert!(matches!(
        TokenCodec::new(SECRET, Algorithm::RS256, 0),
        Err(DomainError::Configuration { .. })
    ));
}

/// Encode with `exp = now + offset` and decode within the same wall-clock
/// second, so the offset is exact relative to the decoder's clock
fn decode_at_offset(codec: &TokenCodec, offset: i64) -> Result<(), TokenError> {
    loop {
        let now = Utc::now().timestamp();
        let claims = Claims::new()
            .with("uid", 42u64)
            .with("jti", "0123456789abcdef0123456789abcdef")
            .with("exp", now + offset);
        let raw = codec.encode(&claims, None).unwrap();
        let outcome = codec.decode(&raw).map(|_| ());
        if Utc::now().timestamp() == now {
            return outcome;
        }
    }
}

#[test]
fn test_leeway_boundaries_are_exact() {
    let leeway = 60;
    let codec = TokenCodec::new(SECRET, Algorithm::HS256, leeway as u64).unwrap();

    assert_eq!(decode_at_offset(&codec, leeway), Ok(()));
    assert_eq!(decode_at_offset(&codec, 0), Ok(()));
    assert_eq!(decode_at_offset(&codec, -leeway), Ok(()));
    assert_eq!(
        decode_at_offset(&codec, -leeway - 1),
        Err(TokenError::TokenExpired)
    );
}

#[test]
fn test_zero_leeway_boundary() {
    let codec = codec();
    assert_eq!(decode_at_offset(&codec, 0), Ok(()));
    assert_eq!(decode_at_offset(&codec, -1), Err(TokenError::TokenExpired));
}
