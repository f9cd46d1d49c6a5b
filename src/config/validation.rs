//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required values are present (upstream base, credential)
//! - Values that end up in headers or URLs are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::upstream::UpstreamBase;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream base is not set (API_BASE)")]
    MissingUpstream,

    #[error("invalid upstream base {base:?}: {reason}")]
    InvalidUpstream { base: String, reason: String },

    #[error("credential is not set (AUTHORIZATION or API_TOKEN)")]
    MissingCredential,

    #[error("both AUTHORIZATION and API_TOKEN are set; pick one")]
    AmbiguousCredential,

    #[error("credential contains characters not allowed in an HTTP header")]
    InvalidCredential,

    #[error("listen address is empty")]
    EmptyListen,
}

/// Check a fully merged configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.base.trim().is_empty() {
        errors.push(ValidationError::MissingUpstream);
    } else if let Err(reason) =
        UpstreamBase::parse(&config.upstream.base, config.upstream.path_prefix.as_deref())
    {
        errors.push(ValidationError::InvalidUpstream {
            base: config.upstream.base.clone(),
            reason: reason.to_string(),
        });
    }

    if config.credential.value.is_empty() {
        errors.push(ValidationError::MissingCredential);
    } else if HeaderValue::from_str(&config.credential.header_value()).is_err() {
        errors.push(ValidationError::InvalidCredential);
    }

    if config.listener.listen.trim().is_empty() {
        errors.push(ValidationError::EmptyListen);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
