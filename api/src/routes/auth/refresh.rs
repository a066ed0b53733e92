use actix_web::{web, HttpRequest, HttpResponse};
use ja_core::errors::TokenError;
use ja_shared::{error_codes, ErrorResponse};
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::RequestWithBody;
use crate::dto::TokenPairResponse;

use super::{service_unavailable, AppState};

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access/refresh pair. The old refresh
/// token is revoked and cannot be used again.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "string"
/// }
/// ```
///
/// With header transport the token is read from the configured header
/// instead and the body may be empty.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "token_type": "Bearer",
///     "expires_in": 1800
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid, expired or revoked refresh token
/// - 503 Service Unavailable: Token store could not be reached
pub async fn refresh(
    req: HttpRequest,
    body: Option<web::Json<Map<String, Value>>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let body = body.map(web::Json::into_inner);
    let source = RequestWithBody::new(&req, body.as_ref());

    let Some(raw) = state.refresh.locate(&source) else {
        return refresh_rejected(error_codes::CREDENTIAL_ABSENT, "Refresh token is empty");
    };

    match state.gate.service().renew(raw).await {
        Ok(pair) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Err(error) if error.is_storage() => service_unavailable(&error),
        Err(TokenError::TokenRevoked) => {
            refresh_rejected(error_codes::TOKEN_REVOKED, "Refresh token no longer exists")
        }
        Err(error) => {
            debug!(error = %error, "Refresh token rejected");
            refresh_rejected(
                error_codes::TOKEN_INVALID,
                "Refresh token is invalid or expired",
            )
        }
    }
}

fn refresh_rejected(code: &str, message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(code, message))
}
