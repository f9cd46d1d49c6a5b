//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// The single upstream API every request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Static credential injected into every outbound request.
    pub credential: CredentialConfig,

    /// Optional response features.
    pub features: FeatureConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address or hostname (e.g., "0.0.0.0").
    pub listen: String,

    /// TCP port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0".to_string(),
            port: 8787,
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL (`https://api.example.com`) or bare hostname (`api.example.com`).
    pub base: String,

    /// Path prefix placed between the base and the inbound path.
    pub path_prefix: Option<String>,

    /// What happens to the upstream call when the caller goes away.
    pub on_client_disconnect: DisconnectPolicy,
}

/// Behaviour of an in-flight upstream call once the inbound connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisconnectPolicy {
    /// Drop the upstream call together with the inbound request.
    #[default]
    Cancel,
    /// Let the upstream call run to completion on a detached task.
    Complete,
}

/// Static credential configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialConfig {
    /// Raw header value or bearer token, depending on `scheme`.
    pub value: String,

    /// How `value` becomes the `Authorization` header.
    pub scheme: AuthScheme,
}

impl CredentialConfig {
    /// The exact `Authorization` header value sent upstream.
    pub fn header_value(&self) -> String {
        match self.scheme {
            AuthScheme::Raw => self.value.clone(),
            AuthScheme::Bearer => format!("Bearer {}", self.value),
        }
    }
}

/// Authorization header construction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Send the configured value verbatim.
    #[default]
    Raw,
    /// Send `Bearer <value>`.
    Bearer,
}

/// Feature flags for the response path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Compress response bodies for callers advertising gzip.
    pub gzip: bool,

    /// Emit the permissive CORS headers.
    pub cors: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            gzip: true,
            cors: true,
        }
    }
}

/// Timeout configuration for the upstream client. Zero disables a timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total upstream request timeout (send + full body read) in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            upstream_secs: 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Prometheus scrape address; metrics exporter is off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "api_proxy=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.listen, "0.0.0.0");
        assert_eq!(config.listener.port, 8787);
        assert!(config.features.gzip);
        assert!(config.features.cors);
        assert_eq!(config.upstream.on_client_disconnect, DisconnectPolicy::Cancel);
        assert!(config.observability.metrics_address.is_none());
    }

    #[test]
    fn test_credential_header_value() {
        let raw = CredentialConfig {
            value: "Token abc".into(),
            scheme: AuthScheme::Raw,
        };
        assert_eq!(raw.header_value(), "Token abc");

        let bearer = CredentialConfig {
            value: "abc".into(),
            scheme: AuthScheme::Bearer,
        };
        assert_eq!(bearer.header_value(), "Bearer abc");
    }

    #[test]
    fn test_partial_toml() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            base = "api.example.com"
            on_client_disconnect = "complete"

            [credential]
            value = "secret"
            scheme = "bearer"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.base, "api.example.com");
        assert_eq!(config.upstream.on_client_disconnect, DisconnectPolicy::Complete);
        assert_eq!(config.credential.scheme, AuthScheme::Bearer);
        assert_eq!(config.listener.port, 8787);
        assert_eq!(config.timeouts.upstream_secs, 60);
    }
}
