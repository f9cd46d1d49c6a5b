//! api-proxy
//!
//! Forwards every inbound request to a single upstream API with a fixed
//! credential, relaying the response with CORS headers and optional gzip.
//!
//! ```text
//!     Client ──▶ listener ──▶ gzip (if accepted) ──▶ forward ──▶ Upstream API
//!     Client ◀── status + X-Generator/Content-Type/Date/Etag + CORS ◀── buffered body
//! ```

use std::process::ExitCode;

use clap::Parser;

use api_proxy::config::{self, Cli, ObservabilityConfig};
use api_proxy::lifecycle::startup;
use api_proxy::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            logging::init(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %config.upstream.base,
        listen = %config.listener.listen,
        port = config.listener.port,
        "api-proxy starting"
    );

    match startup::start(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
