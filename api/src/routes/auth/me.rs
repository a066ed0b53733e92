use actix_web::HttpResponse;

use crate::auth::Identity;
use crate::dto::IdentityResponse;

/// Handler for GET /api/v1/auth/me
///
/// Echoes the identity established by the authentication middleware.
pub async fn me(identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(IdentityResponse {
        user_id: identity.user_id,
        token_id: identity.token_id.clone(),
        claims: identity.claims().as_map().clone(),
    })
}
