//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler on every path
//! - Wire up middleware (tracing, request ID, panic capture, gzip)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::sync::Arc;

use axum::{middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{DisconnectPolicy, FeatureConfig, ProxyConfig};
use crate::http::forward::{forward_handler, Forwarder, ForwarderError};
use crate::http::middleware::gzip_middleware;
use crate::lifecycle::signals::shutdown_signal;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub disconnect_policy: DisconnectPolicy,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ForwarderError> {
        let forwarder = Forwarder::from_config(&config)?;

        let state = AppState {
            forwarder: Arc::new(forwarder),
            disconnect_policy: config.upstream.on_client_disconnect,
        };

        let router = Self::build_router(&config.features, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The panic layer sits inside the gzip layer so a failing handler still
    /// produces a response whose compressed body is closed properly.
    fn build_router(features: &FeatureConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(CatchPanicLayer::new());

        let router = if features.gzip {
            router.layer(middleware::from_fn(gzip_middleware))
        } else {
            router
        };

        router
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until a
    /// signal arrives or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base,
            gzip = self.config.features.gzip,
            cors = self.config.features.cors,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn config() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        // Port 9 (discard) on loopback: nothing listens there in test environments.
        config.upstream.base = "http://127.0.0.1:9".into();
        config.credential.value = "secret".into();
        config.timeouts.connect_secs = 2;
        config
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500_with_error_text() {
        let server = HttpServer::new(config()).unwrap();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/widgets?limit=5").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("127.0.0.1:9"), "unexpected body: {}", text);
    }

    #[tokio::test]
    async fn test_error_responses_are_gzipped_too() {
        let server = HttpServer::new(config()).unwrap();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/x")
                    .header("accept-encoding", "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["content-encoding"], "gzip");
    }

    #[tokio::test]
    async fn test_gzip_layer_is_optional() {
        let mut config = config();
        config.features.gzip = false;
        let server = HttpServer::new(config).unwrap();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/x")
                    .header("accept-encoding", "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get("content-encoding").is_none());
    }

    #[test]
    fn test_rejects_invalid_upstream() {
        let mut config = config();
        config.upstream.base = "ftp://files.example.com".into();
        assert!(HttpServer::new(config).is_err());
    }
}
