//! Reconnect delay policy

use chat_common::BackoffConfig;
use rand::Rng;
use std::time::Duration;

/// Capped exponential backoff with optional jitter
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
    jitter: bool,
}

impl BackoffPolicy {
    /// Deterministic policy: `base * 2^attempt`, capped at `max`
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            jitter: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self {
            base: config.base,
            max: config.max,
            jitter: config.jitter,
        }
    }

    /// Draw each delay uniformly from the upper half of its capped value
    #[must_use]
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Delay before reconnect attempt `attempt` (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.min(20);
        let base_ms = self.base.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        let capped = base_ms.saturating_mul(1_u64 << shift).min(max_ms);

        if self.jitter && capped > 1 {
            Duration::from_millis(rand::thread_rng().gen_range(capped / 2..=capped))
        } else {
            Duration::from_millis(capped)
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&BackoffConfig::default())
    }
}
