//! Command line and environment arguments.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::config::loader::ConfigOverrides;
use crate::config::schema::{DisconnectPolicy, LogFormat};

#[derive(Debug, Parser)]
#[command(name = "api-proxy")]
#[command(version, about = "Forward every request to one upstream API with a fixed credential", long_about = None)]
pub struct Cli {
    /// Optional TOML file providing base values; flags and env override it
    #[arg(short, long, env = "PROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// TCP port to listen on [default: 8787]
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Bind address [default: 0.0.0.0]
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// Upstream base URL or hostname
    #[arg(long, env = "API_BASE")]
    pub api_base: Option<String>,

    /// Path prefix placed between the upstream base and the request path
    #[arg(long, env = "API_PATH_PREFIX")]
    pub path_prefix: Option<String>,

    /// Raw Authorization header value sent upstream
    #[arg(long, env = "AUTHORIZATION", hide_env_values = true)]
    pub authorization: Option<String>,

    /// Token sent upstream as "Bearer <token>"
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Gzip response bodies for callers that accept it [default: true]
    #[arg(long, env = "PROXY_GZIP", value_parser = BoolishValueParser::new())]
    pub gzip: Option<bool>,

    /// Emit permissive CORS headers [default: true]
    #[arg(long, env = "PROXY_CORS", value_parser = BoolishValueParser::new())]
    pub cors: Option<bool>,

    /// Total upstream timeout in seconds, 0 disables [default: 60]
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Upstream connect timeout in seconds, 0 disables [default: 10]
    #[arg(long, env = "UPSTREAM_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: Option<u64>,

    /// What happens to an upstream call when the caller disconnects [default: cancel]
    #[arg(long, env = "ON_CLIENT_DISCONNECT", value_enum)]
    pub on_client_disconnect: Option<DisconnectPolicy>,

    /// Log output format [default: pretty]
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Values given on the command line or in the environment.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            listen: self.listen.clone(),
            api_base: self.api_base.clone(),
            path_prefix: self.path_prefix.clone(),
            authorization: self.authorization.clone(),
            api_token: self.api_token.clone(),
            gzip: self.gzip,
            cors: self.cors,
            upstream_timeout_secs: self.upstream_timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            on_client_disconnect: self.on_client_disconnect,
            log_format: self.log_format,
            metrics_address: self.metrics_address.clone(),
        }
    }
}
