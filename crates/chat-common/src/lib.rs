//! # chat-common
//!
//! Shared ambient stack for the mirror crates: configuration, the client error
//! taxonomy, the credential type, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Token, TokenType};
pub use config::{
    ApiConfig, BackoffConfig, CacheConfig, ClientConfig, ConfigError, Environment, GatewayConfig,
    DEFAULT_INTENTS,
};
pub use error::{ClientError, ClientResult, FieldErrors};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
