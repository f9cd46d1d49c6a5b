//! Gzip response compression.
//!
//! Callers whose `Accept-Encoding` mentions `gzip` get the response body
//! routed through a [`GzipSink`]; everyone else gets the inner response
//! untouched. Status and headers are never rewritten apart from
//! `Content-Encoding` and `Content-Length`.

use std::io::{self, Write};

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use flate2::write::GzEncoder;
use flate2::Compression;
use futures_util::{stream, Stream, StreamExt};

/// A body sink that compresses everything written to it.
///
/// Each write returns the compressed bytes the encoder has produced so far;
/// [`GzipSink::finish`] returns the rest including the gzip trailer.
pub struct GzipSink {
    encoder: GzEncoder<Vec<u8>>,
}

impl GzipSink {
    pub fn new() -> Self {
        Self {
            encoder: GzEncoder::new(Vec::new(), Compression::default()),
        }
    }

    pub fn write(&mut self, chunk: &[u8]) -> io::Result<Bytes> {
        self.encoder.write_all(chunk)?;
        Ok(Bytes::from(std::mem::take(self.encoder.get_mut())))
    }

    /// Close the gzip member. A sink that saw no data still yields a valid,
    /// empty gzip stream.
    pub fn finish(self) -> io::Result<Bytes> {
        self.encoder.finish().map(Bytes::from)
    }
}

impl Default for GzipSink {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the first `Accept-Encoding` value contains `gzip`.
pub fn accepts_gzip(request: &Request) -> bool {
    request
        .headers()
        .get(ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("gzip"))
}

/// Middleware entry point, installed with `axum::middleware::from_fn`.
pub async fn gzip_middleware(request: Request, next: Next) -> Response {
    if !accepts_gzip(&request) {
        return next.run(request).await;
    }

    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();
    parts.headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    parts.headers.remove(CONTENT_LENGTH);

    Response::from_parts(parts, compress_body(body))
}

/// Route every chunk of `body` through a [`GzipSink`].
pub fn compress_body(body: Body) -> Body {
    Body::from_stream(compressed_stream(body.into_data_stream()))
}

enum SinkState<S> {
    Open(S, GzipSink),
    Closed,
}

fn compressed_stream<S>(inner: S) -> impl Stream<Item = Result<Bytes, io::Error>>
where
    S: Stream<Item = Result<Bytes, axum::Error>> + Unpin,
{
    stream::unfold(SinkState::Open(inner, GzipSink::new()), |state| async move {
        let SinkState::Open(mut inner, mut sink) = state else {
            return None;
        };

        loop {
            match inner.next().await {
                Some(Ok(chunk)) => match sink.write(&chunk) {
                    Ok(out) if out.is_empty() => continue,
                    Ok(out) => return Some((Ok(out), SinkState::Open(inner, sink))),
                    Err(e) => return Some((Err(e), SinkState::Closed)),
                },
                Some(Err(e)) => {
                    // Close the member so the bytes already sent still decode.
                    tracing::warn!(error = %e, "Response body failed mid-stream, closing gzip stream");
                    return Some((sink.finish(), SinkState::Closed));
                }
                None => return Some((sink.finish(), SinkState::Closed)),
            }
        }
    })
}
