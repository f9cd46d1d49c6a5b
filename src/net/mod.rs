//! Network layer subsystem.
//!
//! ```text
//! ListenerConfig (listen, port)
//!     → listener.rs (bind, fatal on failure)
//!     → Hand off to HTTP layer (axum::serve)
//! ```

pub mod listener;
