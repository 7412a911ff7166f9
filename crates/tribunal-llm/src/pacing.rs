//! Pacing between consecutive oracle calls
//!
//! Debates are a strict sequence of oracle calls. A [`PacingPolicy`] is
//! awaited before every call after the first, so production deployments can
//! space requests out while tests run at full speed.

use async_trait::async_trait;
use std::time::Duration;

/// Wait inserted between consecutive oracle calls of one debate
#[async_trait]
pub trait PacingPolicy: Send + Sync + std::fmt::Debug {
    /// Suspend before the next call
    async fn pause(&self);
}

/// No waiting at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

#[async_trait]
impl PacingPolicy for NoPacing {
    async fn pause(&self) {}
}

/// Fixed delay between calls
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Create a policy sleeping `delay` between calls
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Create a policy sleeping `ms` milliseconds between calls
    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// The configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    /// One second, matching typical free-tier request limits
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl PacingPolicy for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fixed_delay_waits() {
        let pacing = FixedDelay::millis(20);
        let start = Instant::now();
        pacing.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_no_pacing_returns_immediately() {
        let start = Instant::now();
        NoPacing.pause().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
