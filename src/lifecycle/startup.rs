//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from an already validated configuration
//! - Start the optional metrics exporter
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::forward::ForwarderError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::listener::{self, ListenerError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialise forwarder: {0}")]
    Forwarder(#[from] ForwarderError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("invalid metrics address {address:?}: {reason}")]
    Metrics { address: String, reason: String },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the proxy until a shutdown signal arrives.
pub async fn start(config: ProxyConfig) -> Result<(), StartupError> {
    let server = HttpServer::new(config.clone())?;

    if let Some(address) = &config.observability.metrics_address {
        let addr: SocketAddr = address.parse().map_err(|e: std::net::AddrParseError| StartupError::Metrics {
            address: address.clone(),
            reason: e.to_string(),
        })?;
        crate::observability::metrics::init_metrics(addr).map_err(|e| StartupError::Metrics {
            address: address.clone(),
            reason: e.to_string(),
        })?;
    }

    let listener = listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
