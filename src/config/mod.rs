//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//! flags / environment (args.rs)
//!     → loader.rs (overlay, empty values ignored)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → passed into HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated
//! - All fields have defaults except the upstream base and the credential
//! - Validation separates syntactic (serde) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod upstream;
pub mod validation;

pub use args::Cli;
pub use loader::{load_config, ConfigError, ConfigOverrides};
pub use schema::{
    AuthScheme, CredentialConfig, DisconnectPolicy, FeatureConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, ProxyConfig, TimeoutConfig, UpstreamConfig,
};
pub use upstream::UpstreamBase;
