//! The forwarding handler.
//!
//! # Responsibilities
//! - Build the upstream request: same method and body, target =
//!   base + path + query, headers reduced to `Content-Type` + `Authorization`
//! - Perform the upstream call and buffer the whole response body
//! - Relay status, selected headers and body through [`ResponseRelay`]
//!
//! # Design Decisions
//! - No retries, no caching: every request reaches upstream exactly once
//! - Every inbound header except `Content-Type` is dropped
//! - `OPTIONS` is forwarded like any other method

use std::time::{Duration, Instant};

use axum::body::{Body, HttpBody};
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use thiserror::Error;
use tower_http::request_id::RequestId;

use crate::config::{DisconnectPolicy, ProxyConfig, TimeoutConfig, UpstreamBase};
use crate::http::error::ForwardError;
use crate::http::response::ResponseRelay;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Reasons a [`Forwarder`] cannot be built from a configuration.
#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error("invalid upstream base: {0}")]
    Upstream(#[from] crate::config::upstream::UpstreamError),

    #[error("value not usable as a header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Everything a request needs to reach the upstream. Built once, shared by
/// all requests.
#[derive(Debug)]
pub struct Forwarder {
    client: reqwest::Client,
    upstream: UpstreamBase,
    authorization: HeaderValue,
    relay: ResponseRelay,
}

impl Forwarder {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ForwarderError> {
        let upstream = UpstreamBase::parse(&config.upstream.base, config.upstream.path_prefix.as_deref())?;
        let mut authorization = HeaderValue::from_str(&config.credential.header_value())?;
        authorization.set_sensitive(true);

        Ok(Self {
            client: build_client(&config.timeouts)?,
            upstream,
            authorization,
            relay: ResponseRelay::new(&config.upstream.base, config.features.cors)?,
        })
    }

    /// Forward one inbound request and build the caller's response.
    pub async fn forward(&self, request: Request) -> Result<Response, ForwardError> {
        let start_time = Instant::now();
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let (parts, body) = request.into_parts();
        let method = parts.method.clone();
        let path = path_and_query(parts.uri.path(), parts.uri.query());

        let outbound = self
            .build_outbound(&parts.method, parts.uri.path(), parts.uri.query(), &parts.headers, body)
            .inspect_err(|e| {
                tracing::warn!(request_id = %request_id, method = %method, path = %path, error = %e, "Invalid outbound request");
                metrics::record_request(method.as_str(), e.status().as_u16(), start_time);
            })?;

        let upstream_response = self.client.execute(outbound).await.map_err(|e| {
            let e = ForwardError::Upstream(e);
            tracing::warn!(request_id = %request_id, method = %method, path = %path, error = %e, "Upstream error");
            metrics::record_request(method.as_str(), e.status().as_u16(), start_time);
            e
        })?;

        let status = upstream_response.status();
        let headers = upstream_response.headers().clone();
        let body = upstream_response.bytes().await.map_err(|e| {
            let e = ForwardError::ReadBody(e);
            tracing::warn!(request_id = %request_id, method = %method, path = %path, error = %e, "Failed to read upstream body");
            metrics::record_request(method.as_str(), e.status().as_u16(), start_time);
            e
        })?;

        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status,
            bytes = body.len(),
            "Forwarded request"
        );
        metrics::record_request(method.as_str(), status.as_u16(), start_time);

        Ok(self.relay.relay(status, &headers, body))
    }

    fn build_outbound(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        inbound_headers: &HeaderMap,
        body: Body,
    ) -> Result<reqwest::Request, ForwardError> {
        let target = self.upstream.target(path, query);
        let url = Url::parse(&target).map_err(|e| ForwardError::BuildRequest(format!("parse {:?}: {}", target, e)))?;

        let mut outbound = reqwest::Request::new(method.clone(), url);

        let headers = outbound.headers_mut();
        let content_type = inbound_headers
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(AUTHORIZATION, self.authorization.clone());

        if body.size_hint().exact() != Some(0) {
            *outbound.body_mut() = Some(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        Ok(outbound)
    }
}

fn build_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
    if timeouts.connect_secs > 0 {
        builder = builder.connect_timeout(Duration::from_secs(timeouts.connect_secs));
    }
    if timeouts.upstream_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeouts.upstream_secs));
    }
    builder.build()
}

fn path_and_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", path, q),
        _ => path.to_string(),
    }
}

/// Axum entry point for every path and method.
pub async fn forward_handler(State(state): State<AppState>, request: Request) -> Response {
    let forwarder = state.forwarder.clone();
    match state.disconnect_policy {
        DisconnectPolicy::Cancel => forwarder.forward(request).await.into_response(),
        DisconnectPolicy::Complete => {
            let task = tokio::spawn(async move { forwarder.forward(request).await.into_response() });
            match task.await {
                Ok(response) => response,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    tracing::error!(error = %e, "Forwarding task aborted");
                    (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
                }
            }
        }
    }
}
