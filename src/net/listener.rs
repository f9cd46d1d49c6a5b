//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured address and port
//! - Report bind failures as fatal startup errors
//!
//! Concurrency is whatever the server imposes: one task per connection, no
//! accept-side limit.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Bind `listen:port`. `listen` may be an IP literal or a hostname.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let host = config.listen.trim_start_matches('[').trim_end_matches(']');
    let listener = TcpListener::bind((host, config.port))
        .await
        .map_err(|source| ListenerError::Bind {
            address: display_address(config),
            source,
        })?;

    let local_addr: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(
        address = ?local_addr,
        "Listener bound"
    );

    Ok(listener)
}

fn display_address(config: &ListenerConfig) -> String {
    if config.listen.contains(':') && !config.listen.starts_with('[') {
        format!("[{}]:{}", config.listen, config.port)
    } else {
        format!("{}:{}", config.listen, config.port)
    }
}
