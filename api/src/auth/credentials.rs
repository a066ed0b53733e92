//! Locating raw credentials in a request

use actix_web::dev::ServiceRequest;
use actix_web::HttpRequest;
use ja_shared::{BearerConfig, RefreshConfig, RefreshTransport};
use regex::Regex;
use serde_json::{Map, Value};

/// Read access to the parts of a request that can carry a token
pub trait CredentialSource {
    /// Value of a header, if present and valid UTF-8
    fn header(&self, name: &str) -> Option<&str>;

    /// String field of the request body, if the source has one
    fn body_param(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl CredentialSource for HttpRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }
}

impl CredentialSource for ServiceRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }
}

/// A request paired with its already parsed JSON body
pub struct RequestWithBody<'a> {
    request: &'a HttpRequest,
    body: Option<&'a Map<String, Value>>,
}

impl<'a> RequestWithBody<'a> {
    pub fn new(request: &'a HttpRequest, body: Option<&'a Map<String, Value>>) -> Self {
        Self { request, body }
    }
}

impl CredentialSource for RequestWithBody<'_> {
    fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    fn body_param(&self, name: &str) -> Option<&str> {
        self.body?.get(name)?.as_str()
    }
}

/// Pulls the access token out of a configured header
///
/// With a pattern, the first capture group is the token and a header that
/// does not match counts as no credential at all.
#[derive(Debug, Clone)]
pub struct BearerExtractor {
    header: String,
    pattern: Option<Regex>,
}

impl BearerExtractor {
    pub fn new(config: &BearerConfig) -> Result<Self, regex::Error> {
        let pattern = config.pattern.as_deref().map(Regex::new).transpose()?;
        Ok(Self {
            header: config.header.clone(),
            pattern,
        })
    }

    /// The raw token, or `None` when no usable credential was supplied
    pub fn extract<'a, S>(&self, source: &'a S) -> Option<&'a str>
    where
        S: CredentialSource + ?Sized,
    {
        let value = source.header(&self.header)?;
        let token = match &self.pattern {
            Some(pattern) => pattern.captures(value)?.get(1)?.as_str(),
            None => value,
        };
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }
}

/// Reads the refresh token from the configured transport
#[derive(Debug, Clone)]
pub struct RefreshTokenLocator {
    transport: RefreshTransport,
}

impl RefreshTokenLocator {
    pub fn new(config: &RefreshConfig) -> Self {
        Self {
            transport: config.transport.clone(),
        }
    }

    pub fn transport(&self) -> &RefreshTransport {
        &self.transport
    }

    pub fn locate<'a, S>(&self, source: &'a S) -> Option<&'a str>
    where
        S: CredentialSource + ?Sized,
    {
        let raw = match &self.transport {
            RefreshTransport::Body(field) => source.body_param(field),
            RefreshTransport::Header(name) => source.header(name),
        }?
        .trim();
        (!raw.is_empty()).then_some(raw)
    }
}
