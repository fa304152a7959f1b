//! Client configuration
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Everything except the credential has a default, so tests build
//! configs directly with `..Default::default()`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::{Token, TokenType};

/// Every intent the platform grants without extra approval
pub const DEFAULT_INTENTS: u64 = 98_045;

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub env: Environment,
    pub token: Token,
    pub gateway: GatewayConfig,
    pub backoff: BackoffConfig,
    pub api: ApiConfig,
    pub cache: CacheConfig,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// `APP_ENV` (after loading `.env`), falling back to development
    ///
    /// Unparsable values also fall back; `ClientConfig::from_env` rejects them.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        env::var("APP_ENV")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Push connection settings shared by every shard
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub shard_count: u32,
    /// Capability bitmask sent on identify
    pub intents: u64,
    /// Member count above which a guild snapshot omits offline members
    pub large_threshold: u32,
    /// Minimum spacing between identify attempts across all shards
    pub identify_interval: Duration,
    /// How long a connection must stay up before the backoff counter resets
    pub sustained_connection: Duration,
    /// Capacity of the fan-in and notification channels
    pub event_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            shard_count: 1,
            intents: DEFAULT_INTENTS,
            large_threshold: 50,
            identify_interval: Duration::from_millis(5000),
            sustained_connection: Duration::from_secs(60),
            event_buffer: 1024,
        }
    }
}

/// Reconnect policy
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base: Duration,
    pub max: Duration,
    /// Failed resume attempts tolerated before falling back to identify
    pub max_resume_attempts: u32,
    /// Randomize each delay within its upper half
    pub jitter: bool,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            max: Duration::from_millis(60_000),
            max_resume_attempts: 3,
            jitter: true,
        }
    }
}

/// Request/response collaborator settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// What the entity store keeps
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub messages: bool,
    pub presences: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            messages: true,
            presences: true,
        }
    }
}

// Default value functions
fn default_gateway_url() -> String {
    "wss://gateway.example.com/?v=1&encoding=json".to_string()
}

fn default_api_url() -> String {
    "https://api.example.com/v1".to_string()
}

fn default_user_agent() -> String {
    format!("chat-mirror/{}", env!("CARGO_PKG_VERSION"))
}

/// Read an optional variable, falling back to `default` when unset
fn var_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default),
    }
}

fn millis_or(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    var_or(name, default.as_millis() as u64).map(Duration::from_millis)
}

impl ClientConfig {
    /// Configuration with defaults everywhere except the credential
    #[must_use]
    pub fn new(token: Token) -> Self {
        Self {
            env: Environment::default(),
            token,
            gateway: GatewayConfig::default(),
            backoff: BackoffConfig::default(),
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `CHAT_TOKEN` is missing or a variable fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let secret = env::var("CHAT_TOKEN").map_err(|_| ConfigError::MissingVar("CHAT_TOKEN"))?;
        let token_type = var_or("CHAT_TOKEN_TYPE", TokenType::Bot)?;
        let gateway_defaults = GatewayConfig::default();
        let backoff_defaults = BackoffConfig::default();

        let config = Self {
            env: var_or("APP_ENV", Environment::default())?,
            token: Token::new(secret, token_type),
            gateway: GatewayConfig {
                url: env::var("CHAT_GATEWAY_URL").unwrap_or_else(|_| default_gateway_url()),
                shard_count: var_or("CHAT_SHARD_COUNT", gateway_defaults.shard_count)?,
                intents: var_or("CHAT_INTENTS", gateway_defaults.intents)?,
                large_threshold: var_or("CHAT_LARGE_THRESHOLD", gateway_defaults.large_threshold)?,
                identify_interval: millis_or(
                    "CHAT_IDENTIFY_INTERVAL_MS",
                    gateway_defaults.identify_interval,
                )?,
                sustained_connection: Duration::from_secs(var_or(
                    "CHAT_SUSTAINED_CONNECTION_SECS",
                    gateway_defaults.sustained_connection.as_secs(),
                )?),
                event_buffer: var_or("CHAT_EVENT_BUFFER", gateway_defaults.event_buffer)?,
            },
            backoff: BackoffConfig {
                base: millis_or("CHAT_BACKOFF_BASE_MS", backoff_defaults.base)?,
                max: millis_or("CHAT_BACKOFF_MAX_MS", backoff_defaults.max)?,
                max_resume_attempts: var_or(
                    "CHAT_MAX_RESUME_ATTEMPTS",
                    backoff_defaults.max_resume_attempts,
                )?,
                jitter: var_or("CHAT_BACKOFF_JITTER", backoff_defaults.jitter)?,
            },
            api: ApiConfig {
                base_url: env::var("CHAT_API_URL").unwrap_or_else(|_| default_api_url()),
                user_agent: env::var("CHAT_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            },
            cache: CacheConfig {
                messages: var_or("CHAT_CACHE_MESSAGES", true)?,
                presences: var_or("CHAT_CACHE_PRESENCES", true)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the gateway would refuse anyway
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.shard_count == 0 {
            return Err(ConfigError::InvalidValue("CHAT_SHARD_COUNT", "0".to_string()));
        }
        if !(50..=250).contains(&self.gateway.large_threshold) {
            return Err(ConfigError::InvalidValue(
                "CHAT_LARGE_THRESHOLD",
                self.gateway.large_threshold.to_string(),
            ));
        }
        if self.gateway.event_buffer == 0 {
            return Err(ConfigError::InvalidValue("CHAT_EVENT_BUFFER", "0".to_string()));
        }
        if self.backoff.base > self.backoff.max {
            return Err(ConfigError::InvalidValue(
                "CHAT_BACKOFF_BASE_MS",
                self.backoff.base.as_millis().to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(Token::new("secret".to_string(), TokenType::Bot))
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("PRODUCTION".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" staging".trim().parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_default_values() {
        let config = config();
        assert_eq!(config.gateway.shard_count, 1);
        assert_eq!(config.gateway.large_threshold, 50);
        assert_eq!(config.gateway.identify_interval, Duration::from_secs(5));
        assert_eq!(config.backoff.max, Duration::from_secs(60));
        assert_eq!(config.backoff.max_resume_attempts, 3);
        assert!(config.cache.messages);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_shards() {
        let mut config = config();
        config.gateway.shard_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue("CHAT_SHARD_COUNT", _))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_backoff() {
        let mut config = config();
        config.backoff.base = Duration::from_secs(120);
        assert!(config.validate().is_err());
    }
}
