//! Forwarding failures and how they reach the caller.
//!
//! Every failure is terminal for its request and is returned with the raw
//! error text as a plaintext body.

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The outbound request could not be built (bad method or URL).
    #[error("{0}")]
    BuildRequest(String),

    /// The upstream call failed (connect, TLS, timeout).
    #[error("{}", chain(.0))]
    Upstream(reqwest::Error),

    /// The upstream body could not be read to the end.
    #[error("{}", chain(.0))]
    ReadBody(reqwest::Error),
}

/// `outer: cause: root cause`, so the caller sees why a connection failed and
/// not only which URL was being requested.
fn chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.ends_with(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::BuildRequest(_) => StatusCode::BAD_REQUEST,
            ForwardError::Upstream(_) | ForwardError::ReadBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
