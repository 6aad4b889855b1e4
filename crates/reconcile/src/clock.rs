//! Sleep abstraction for readiness polling
//!
//! `TokioClock` really sleeps; `ManualClock` only records the requested
//! durations so tests can check elapsed time without waiting.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Source of delays between polls
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait::async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Simulated clock: sleeps return immediately and advance virtual time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time slept
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.sleeps().iter().sum()
    }

    /// Every requested sleep, in order
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        tokio::task::yield_now().await;
    }
}
