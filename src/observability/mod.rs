//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! forwarding handler / middleware / lifecycle produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - One log line per forwarded request, carrying the request ID
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
