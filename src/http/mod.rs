//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + request id layers)
//!     → middleware/gzip.rs (body compression when accepted)
//!     → forward.rs (build upstream request, call, buffer body)
//!     → response.rs (status, copied headers, CORS)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod middleware;
pub mod response;
pub mod server;

pub use error::ForwardError;
pub use forward::Forwarder;
pub use server::HttpServer;
