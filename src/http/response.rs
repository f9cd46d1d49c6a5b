//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream status and a fixed subset of its headers
//! - Add the `X-Generator` header naming the proxied upstream
//! - Add permissive CORS headers (optional)
//!
//! # Design Decisions
//! - Upstream body is fully buffered before the response is built
//! - Copied headers are always present, empty when upstream omitted them
//! - Every other upstream header is dropped

use axum::body::{Body, Bytes};
use axum::http::header::{
    InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, DATE, ETAG,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

pub const X_GENERATOR: HeaderName = HeaderName::from_static("x-generator");

/// Upstream headers relayed to the caller.
const COPIED_HEADERS: [HeaderName; 3] = [CONTENT_TYPE, DATE, ETAG];

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "POST, GET, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str =
    "Accept, Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization, Channel";

/// Builds caller-facing responses from buffered upstream responses.
#[derive(Debug, Clone)]
pub struct ResponseRelay {
    generator: HeaderValue,
    cors: bool,
}

impl ResponseRelay {
    /// `configured_base` is the upstream exactly as the operator wrote it.
    pub fn new(configured_base: &str, cors: bool) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            generator: HeaderValue::from_str(&format!("API Proxy for {}", configured_base))?,
            cors,
        })
    }

    pub fn relay(&self, status: StatusCode, upstream_headers: &HeaderMap, body: Bytes) -> Response {
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        headers.insert(X_GENERATOR, self.generator.clone());
        for name in COPIED_HEADERS {
            let value = upstream_headers
                .get(&name)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(""));
            headers.insert(name, value);
        }

        if self.cors {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(CORS_ALLOW_ORIGIN));
            headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(CORS_ALLOW_METHODS));
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(CORS_ALLOW_HEADERS));
        }

        response
    }
}
