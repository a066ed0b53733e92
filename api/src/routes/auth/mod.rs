//! Authentication route handlers
//!
//! - Token renewal
//! - Logout
//! - Identity of the current caller

pub mod logout;
pub mod me;
pub mod refresh;

use actix_web::{http::StatusCode, HttpResponse};
use ja_core::errors::TokenError;
use ja_shared::{error_codes, ErrorResponse};

use crate::auth::{AuthGate, RefreshTokenLocator};

/// Shared state of the auth endpoints
#[derive(Clone)]
pub struct AppState {
    /// Gate verifying access tokens; also owns the token service
    pub gate: AuthGate,
    /// Where the refresh token is read from
    pub refresh: RefreshTokenLocator,
}

impl AppState {
    pub fn new(gate: AuthGate, refresh: RefreshTokenLocator) -> Self {
        Self { gate, refresh }
    }
}

/// `503` for a whitelist store that could not answer
pub(crate) fn service_unavailable(error: &TokenError) -> HttpResponse {
    tracing::error!(error = %error, "Token store unavailable");
    HttpResponse::build(StatusCode::SERVICE_UNAVAILABLE).json(ErrorResponse::new(
        error_codes::SERVICE_UNAVAILABLE,
        "Authentication service temporarily unavailable",
    ))
}
