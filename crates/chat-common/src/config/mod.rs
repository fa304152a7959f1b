//! Configuration structs

mod client_config;

pub use client_config::{
    ApiConfig, BackoffConfig, CacheConfig, ClientConfig, ConfigError, Environment, GatewayConfig,
    DEFAULT_INTENTS,
};
