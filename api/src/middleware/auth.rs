//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the bearer token from the configured header,
//! checks it against the whitelist through the `AuthGate`, and injects the
//! caller's `Identity` into request extensions.
//!
//! The middleware can work in two modes:
//! 1. Required mode: any failure ends the request with `401` and a
//!    `WWW-Authenticate` challenge
//! 2. Optional mode: a request without credentials passes through
//!    anonymously, a bad credential is still refused

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::WWW_AUTHENTICATE,
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use ja_shared::ErrorResponse;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tracing::debug;

use crate::auth::{AuthFailure, AuthGate, Identity};

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    gate: AuthGate,
    optional: bool,
}

impl JwtAuth {
    /// Creates a middleware that requires a valid access token
    pub fn new(gate: AuthGate) -> Self {
        Self {
            gate,
            optional: false,
        }
    }

    /// Creates a middleware that lets anonymous requests through
    pub fn optional(gate: AuthGate) -> Self {
        Self {
            gate,
            optional: true,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            gate: self.gate.clone(),
            optional: self.optional,
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    gate: AuthGate,
    optional: bool,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = self.gate.clone();
        let optional = self.optional;

        Box::pin(async move {
            let outcome = gate.authenticate_request(&req).await;
            match outcome {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                }
                Err(AuthFailure::CredentialAbsent) if optional => {}
                Err(failure) => {
                    debug!(
                        path = %req.path(),
                        reason = failure.description(),
                        "Request rejected by authentication gate"
                    );
                    let response = unauthorized(&gate, failure);
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// `401` with a bearer challenge and a JSON error body
pub fn unauthorized(gate: &AuthGate, failure: AuthFailure) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, gate.challenge(&failure)))
        .json(ErrorResponse::new(failure.error_code(), failure.description()))
}

/// Extractor for required authentication
impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let identity = req.extensions().get::<Identity>().cloned();
        ready(Ok(OptionalIdentity(identity)))
    }
}
