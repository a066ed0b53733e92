use actix_web::{web, HttpRequest, HttpResponse};
use ja_shared::ErrorResponse;
use serde_json::{Map, Value};

use crate::auth::{Identity, RequestWithBody};
use crate::dto::LogoutResponse;

use super::{service_unavailable, AppState};

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the access token that authenticated the request and, when the
/// refresh token is supplied the same way as for renewal, that one too.
/// Requires authentication via Bearer token in Authorization header.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Logged out successfully"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token, or a refresh token
///   that does not belong to the caller
/// - 503 Service Unavailable: Token store could not be reached
pub async fn logout(
    req: HttpRequest,
    identity: Identity,
    body: Option<web::Json<Map<String, Value>>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let body = body.map(web::Json::into_inner);
    let source = RequestWithBody::new(&req, body.as_ref());
    let refresh = state.refresh.locate(&source);

    match state
        .gate
        .service()
        .logout(identity.raw_token(), refresh)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
        Err(error) if error.is_storage() => service_unavailable(&error),
        Err(error) => HttpResponse::Unauthorized().json(ErrorResponse::from(error)),
    }
}
