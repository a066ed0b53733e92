//! Bearer authentication for inbound requests
//!
//! - `credentials` locates raw tokens in a request (bearer header, refresh
//!   body field or header)
//! - `verifier` erases the store type of the token service
//! - `gate` turns a raw token into an `Identity` or a challenge reason

pub mod credentials;
pub mod gate;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use credentials::{BearerExtractor, CredentialSource, RefreshTokenLocator, RequestWithBody};
pub use gate::{AuthFailure, AuthGate, Identity, RejectReason};
pub use verifier::TokenServiceWrapper;
