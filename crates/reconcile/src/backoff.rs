//! # Fibonacci Backoff
//!
//! Provides the delay sequence between readiness polls.
//! The sequence grows like Fibonacci from a minimum step and is capped at a
//! maximum, which readiness waits set to the policy interval. With
//! `min == max` the sequence is constant, which is how fixed-interval polling
//! is expressed.
//!
//! Because no delay ever exceeds the cap, `n` delays never add up to more than
//! `n × max`.

use crate::model::{PollSchedule, ReadinessPolicy};
use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, starting at `min, min`, capped at `max`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Previous delay in milliseconds
    prev_ms: u64,
    /// Next delay in milliseconds
    current_ms: u64,
    /// Cap in milliseconds
    max_ms: u64,
}

impl FibonacciBackoff {
    /// Create a backoff starting at `min` and capped at `max`
    ///
    /// A `min` above `max` is clamped to `max`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let max_ms = duration_ms(max);
        Self {
            prev_ms: 0,
            current_ms: duration_ms(min).min(max_ms),
            max_ms,
        }
    }

    /// Constant delay of `interval`
    #[must_use]
    pub fn fixed(interval: Duration) -> Self {
        Self::new(interval, interval)
    }

    /// Delay sequence for a readiness policy
    #[must_use]
    pub fn for_policy(policy: &ReadinessPolicy) -> Self {
        match policy.schedule {
            PollSchedule::Fixed => Self::fixed(policy.interval),
            PollSchedule::Fibonacci { first } => Self::new(first, policy.interval),
        }
    }

    /// Get the next delay and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_ms;
        let next = self.prev_ms.saturating_add(self.current_ms);
        self.prev_ms = self.current_ms;
        self.current_ms = next.min(self.max_ms);
        Duration::from_millis(result)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
