//! Upstream base resolution.
//!
//! The configured base is either a full URL (`https://api.example.com/v2`) or a
//! bare hostname (`api.example.com`), which is served over `https`. Targets are
//! built by plain concatenation so the inbound path and query reach the
//! upstream byte for byte.

use thiserror::Error;
use url::Url;

/// Reasons an upstream base is rejected.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("base must not carry a query or fragment")]
    QueryOrFragment,
}

/// Normalised upstream base, ready for path concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBase {
    base: String,
}

impl UpstreamBase {
    /// Resolve a configured base and optional path prefix.
    pub fn parse(raw: &str, path_prefix: Option<&str>) -> Result<Self, UpstreamError> {
        let raw = raw.trim();
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let url = Url::parse(&with_scheme)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(UpstreamError::UnsupportedScheme(other.to_string())),
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(UpstreamError::QueryOrFragment);
        }

        let mut base = with_scheme.trim_end_matches('/').to_string();
        if let Some(prefix) = path_prefix.map(|p| p.trim().trim_matches('/')) {
            if !prefix.is_empty() {
                base.push('/');
                base.push_str(prefix);
            }
        }

        Ok(Self { base })
    }

    /// `base + path ["?" + query]`; an empty query adds nothing.
    pub fn target(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.base, path, q),
            _ => format!("{}{}", self.base, path),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    #[cfg(test)]
    pub(crate) fn unchecked(base: &str) -> Self {
        Self { base: base.to_string() }
    }
}
