//! Bounded retries for ledger calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Fixed,
    /// `delay * (attempt + 1)`
    Linear,
    /// `delay * 2^attempt`
    #[default]
    Exponential,
    /// Exponential plus up to 10% random jitter.
    ExponentialWithJitter,
}

impl BackoffStrategy {
    /// Delay before retry number `attempt` (0 = first retry), capped at
    /// `max_delay`.
    pub fn calculate_delay(
        &self,
        attempt: u32,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> Duration {
        let scaled = |factor: u32| initial_delay.checked_mul(factor).unwrap_or(max_delay);
        let delay = match self {
            BackoffStrategy::Fixed => initial_delay,
            BackoffStrategy::Linear => scaled(attempt.saturating_add(1)),
            BackoffStrategy::Exponential => scaled(2u32.saturating_pow(attempt)),
            BackoffStrategy::ExponentialWithJitter => {
                let base = scaled(2u32.saturating_pow(attempt));
                let jitter = base.as_millis() as f64 * 0.1 * rand::thread_rng().gen::<f64>();
                base.saturating_add(Duration::from_millis(jitter as u64))
            }
        };
        delay.min(max_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = try once).
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub strategy: BackoffStrategy,
}

impl RetryPolicy {
    pub fn exponential() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            strategy: BackoffStrategy::Exponential,
        }
    }

    pub fn fixed(delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: delay,
            max_delay: delay,
            strategy: BackoffStrategy::Fixed,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        RetryPolicy::fixed(Duration::ZERO).with_max_attempts(0)
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_strategy(mut self, strategy: BackoffStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        self.strategy
            .calculate_delay(attempt, self.initial_delay, self.max_delay)
    }

    /// Run `operation` until it succeeds or the retries run out, returning
    /// the last error in that case.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute_while(operation, |_| true).await
    }

    /// Like [`RetryPolicy::execute`], but an error for which `is_transient`
    /// returns `false` is returned at once.
    pub async fn execute_while<F, Fut, T, E, P>(
        &self,
        mut operation: F,
        is_transient: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) if is_transient(&err) && attempt < self.max_attempts => {
                    let delay = self.calculate_delay(attempt);
                    warn!(attempt, ?delay, error = %err, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential()
    }
}
