//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AuthScheme, DisconnectPolicy, LogFormat, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied by flags or environment variables. `None` keeps the file
/// (or default) value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub listen: Option<String>,
    pub api_base: Option<String>,
    pub path_prefix: Option<String>,
    pub authorization: Option<String>,
    pub api_token: Option<String>,
    pub gzip: Option<bool>,
    pub cors: Option<bool>,
    pub upstream_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub on_client_disconnect: Option<DisconnectPolicy>,
    pub log_format: Option<LogFormat>,
    pub metrics_address: Option<String>,
}

/// Parse a TOML file without validating it.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the process configuration: file (if any) → overrides → validation.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ProxyConfig, ConfigError> {
    let base = match path {
        Some(path) => read_config_file(path)?,
        None => ProxyConfig::default(),
    };

    let config = apply_overrides(base, overrides).map_err(|e| ConfigError::Validation(vec![e]))?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Layer overrides on top of a base configuration.
pub fn apply_overrides(
    mut config: ProxyConfig,
    overrides: &ConfigOverrides,
) -> Result<ProxyConfig, ValidationError> {
    let set = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();

    if let Some(port) = overrides.port {
        config.listener.port = port;
    }
    if let Some(listen) = set(&overrides.listen) {
        config.listener.listen = listen;
    }
    if let Some(base) = set(&overrides.api_base) {
        config.upstream.base = base;
    }
    if let Some(prefix) = set(&overrides.path_prefix) {
        config.upstream.path_prefix = Some(prefix);
    }

    match (set(&overrides.authorization), set(&overrides.api_token)) {
        (Some(_), Some(_)) => return Err(ValidationError::AmbiguousCredential),
        (Some(raw), None) => {
            config.credential.value = raw;
            config.credential.scheme = AuthScheme::Raw;
        }
        (None, Some(token)) => {
            config.credential.value = token;
            config.credential.scheme = AuthScheme::Bearer;
        }
        (None, None) => {}
    }

    if let Some(gzip) = overrides.gzip {
        config.features.gzip = gzip;
    }
    if let Some(cors) = overrides.cors {
        config.features.cors = cors;
    }
    if let Some(secs) = overrides.upstream_timeout_secs {
        config.timeouts.upstream_secs = secs;
    }
    if let Some(secs) = overrides.connect_timeout_secs {
        config.timeouts.connect_secs = secs;
    }
    if let Some(policy) = overrides.on_client_disconnect {
        config.upstream.on_client_disconnect = policy;
    }
    if let Some(format) = overrides.log_format {
        config.observability.log_format = format;
    }
    if let Some(addr) = set(&overrides.metrics_address) {
        config.observability.metrics_address = Some(addr);
    }

    Ok(config)
}
