//! Unit tests for credential extraction

use actix_web::test::TestRequest;
use ja_shared::{BearerConfig, RefreshConfig};
use serde_json::{json, Map, Value};

use crate::auth::credentials::{BearerExtractor, RefreshTokenLocator, RequestWithBody};

fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[test]
fn test_extract_bearer_token() {
    let extractor = BearerExtractor::new(&BearerConfig::default()).unwrap();

    let req = TestRequest::default()
        .insert_header(("Authorization", "Bearer test_token_123"))
        .to_http_request();
    assert_eq!(extractor.extract(&req), Some("test_token_123"));

    let req = TestRequest::default()
        .insert_header(("Authorization", "Bearer    spaced"))
        .to_http_request();
    assert_eq!(extractor.extract(&req), Some("spaced"));

    let req = TestRequest::default()
        .insert_header(("Authorization", "test_token_123"))
        .to_http_request();
    assert_eq!(extractor.extract(&req), None);

    let req = TestRequest::default()
        .insert_header(("Authorization", "Bearer "))
        .to_http_request();
    assert_eq!(extractor.extract(&req), None);

    let req = TestRequest::default().to_http_request();
    assert_eq!(extractor.extract(&req), None);
}

#[test]
fn test_custom_header_without_pattern() {
    let config = BearerConfig {
        header: "X-Api-Token".to_string(),
        pattern: None,
        realm: "api".to_string(),
    };
    let extractor = BearerExtractor::new(&config).unwrap();

    let req = TestRequest::default()
        .insert_header(("X-Api-Token", "raw-token"))
        .insert_header(("Authorization", "Bearer ignored"))
        .to_srv_request();
    assert_eq!(extractor.extract(&req), Some("raw-token"));
}

#[test]
fn test_invalid_pattern_rejected() {
    let config = BearerConfig {
        pattern: Some("(unclosed".to_string()),
        ..BearerConfig::default()
    };
    assert!(BearerExtractor::new(&config).is_err());
}

#[test]
fn test_refresh_token_from_body() {
    let locator = RefreshTokenLocator::new(&RefreshConfig::default());
    let req = TestRequest::default().to_http_request();

    let payload = body(json!({"refresh_token": "r.t.x"}));
    assert_eq!(
        locator.locate(&RequestWithBody::new(&req, Some(&payload))),
        Some("r.t.x")
    );

    let payload = body(json!({"refresh_token": ""}));
    assert_eq!(locator.locate(&RequestWithBody::new(&req, Some(&payload))), None);

    let payload = body(json!({"refresh_token": 17}));
    assert_eq!(locator.locate(&RequestWithBody::new(&req, Some(&payload))), None);

    assert_eq!(locator.locate(&RequestWithBody::new(&req, None)), None);
}

#[test]
fn test_refresh_token_from_header() {
    let locator = RefreshTokenLocator::new(&RefreshConfig::header("Authorization-Refresh"));
    let req = TestRequest::default()
        .insert_header(("Authorization-Refresh", "r.t.y"))
        .to_http_request();

    let payload = body(json!({"refresh_token": "ignored"}));
    assert_eq!(
        locator.locate(&RequestWithBody::new(&req, Some(&payload))),
        Some("r.t.y")
    );
    assert_eq!(locator.locate(&req), Some("r.t.y"));
}
