//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_proxy::config::{AuthScheme, ProxyConfig};
use api_proxy::{HttpServer, Shutdown};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct UpstreamState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// A mock upstream that records every request and answers with a fixed response.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().unwrap()
    }
}

async fn record(
    State(state): State<UpstreamState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.requests.lock().unwrap().push(Recorded {
        method,
        uri: uri.to_string(),
        headers,
        body,
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (
        state.status,
        [
            ("content-type", "application/json"),
            ("etag", "\"v1\""),
            ("set-cookie", "upstream=1"),
            ("x-upstream-internal", "leak"),
        ],
        state.body,
    )
        .into_response()
}

/// Start a mock upstream on an ephemeral port.
pub async fn start_mock_upstream(status: u16, body: &'static str) -> MockUpstream {
    start_slow_upstream(status, body, Duration::ZERO).await
}

/// Start a mock upstream that waits `delay` before answering.
pub async fn start_slow_upstream(status: u16, body: &'static str, delay: Duration) -> MockUpstream {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = UpstreamState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        delay,
        requests: requests.clone(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(record).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, requests }
}

/// Read until the end of the request head; anything after it stays unread.
async fn read_request_head(socket: &mut TcpStream) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    head
}

/// Start a raw TCP upstream that answers every request with `response`
/// verbatim and then closes the connection.
pub async fn start_raw_upstream(response: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let _ = socket.write_all(response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Outcome counters of a [`start_watchful_upstream`].
#[derive(Clone, Default)]
pub struct Outcomes {
    pub finished: Arc<AtomicU32>,
    pub dropped: Arc<AtomicU32>,
}

impl Outcomes {
    pub fn finished(&self) -> u32 {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// Start an upstream that holds each request for `delay` while watching the
/// connection. A connection closed by the proxy during the delay counts as
/// dropped; otherwise the upstream answers and counts it as finished.
pub async fn start_watchful_upstream(delay: Duration) -> (SocketAddr, Outcomes) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let outcomes = Outcomes::default();
    let counters = outcomes.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let counters = counters.clone();
            tokio::spawn(async move {
                read_request_head(&mut socket).await;

                let deadline = tokio::time::Instant::now() + delay;
                let mut buf = [0u8; 256];
                loop {
                    match tokio::time::timeout_at(deadline, socket.read(&mut buf)).await {
                        Ok(Ok(0)) | Ok(Err(_)) => {
                            counters.dropped.fetch_add(1, Ordering::SeqCst);
                            return;
                        }
                        // Leftover request body bytes.
                        Ok(Ok(_)) => continue,
                        Err(_) => break,
                    }
                }

                let response = b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\ndone";
                if socket.write_all(response).await.is_ok() {
                    counters.finished.fetch_add(1, Ordering::SeqCst);
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, outcomes)
}

/// Minimal valid config pointing at `base` with a bearer token.
pub fn proxy_config(base: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.base = base.to_string();
    config.credential.value = "t0k".into();
    config.credential.scheme = AuthScheme::Bearer;
    config
}

/// A running proxy; stops when dropped.
pub struct RunningProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningProxy {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy on an ephemeral loopback port.
pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    RunningProxy { addr, shutdown }
}

/// Client without pooling or proxy env influence.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Decode a gzip body.
pub fn gunzip(data: &[u8]) -> Vec<u8> {
    use std::io::Read;

    let mut out = Vec::new();
    flate2::read::GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}
