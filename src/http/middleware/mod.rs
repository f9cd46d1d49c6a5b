//! Request/response middleware.

pub mod gzip;

pub use gzip::{gzip_middleware, GzipSink};
