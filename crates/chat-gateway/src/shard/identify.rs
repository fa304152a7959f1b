//! Global identify rate limit

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Admits one identify per interval across every shard of a manager
pub struct IdentifyGate {
    limiter: DefaultDirectRateLimiter,
    interval: Duration,
}

impl IdentifyGate {
    /// A zero interval admits everything
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let quota = Quota::with_period(interval).unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX));
        Self {
            limiter: RateLimiter::direct(quota),
            interval,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for this caller's identify slot
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a slot if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for IdentifyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifyGate")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_one_slot_per_window() {
        let gate = IdentifyGate::new(Duration::from_secs(60));
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
    }

    #[test]
    fn test_zero_interval_is_unlimited() {
        let gate = IdentifyGate::new(Duration::ZERO);
        for _ in 0..100 {
            assert!(gate.try_acquire());
        }
    }

    #[tokio::test]
    async fn test_until_ready_spaces_callers() {
        let gate = IdentifyGate::new(Duration::from_millis(50));
        let start = Instant::now();
        gate.until_ready().await;
        gate.until_ready().await;
        gate.until_ready().await;
        assert!(start.elapsed() >= Duration::from_millis(90));
    }
}
