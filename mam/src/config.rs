//! TOML configuration for publishers and readers.
//!
//! ```toml
//! [channel]
//! security = 2
//! start = 0
//! count = 4
//! next_count = 4
//!
//! [fetch]
//! max_attempts = 5
//! initial_delay_ms = 200
//! max_delay_ms = 10000
//! backoff = "exponential_with_jitter"
//! ```
//!
//! Every field is optional.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::retry::{BackoffStrategy, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    /// Signature security level, 1 to 3.
    pub security: u8,
    /// First leaf of the channel.
    pub start: usize,
    /// Leaves in the first window.
    pub count: usize,
    /// Leaves in every later window.
    pub next_count: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            security: 2,
            start: 0,
            count: 1,
            next_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Retries per ledger lookup after the first attempt.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff: BackoffStrategy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 30_000,
            backoff: BackoffStrategy::Exponential,
        }
    }
}

impl FetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential()
            .with_max_attempts(self.max_attempts)
            .with_initial_delay(Duration::from_millis(self.initial_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_strategy(self.backoff)
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        config.retry_policy()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MamConfig {
    pub channel: ChannelConfig,
    pub fetch: FetchConfig,
}

impl MamConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MamError;

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(MamConfig::from_toml_str("").unwrap(), MamConfig::default());
    }

    #[test]
    fn full_config_parses() {
        let config = MamConfig::from_toml_str(
            r#"
            [channel]
            security = 1
            start = 10
            count = 4
            next_count = 2

            [fetch]
            max_attempts = 5
            initial_delay_ms = 200
            max_delay_ms = 1000
            backoff = "exponential_with_jitter"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.channel,
            ChannelConfig {
                security: 1,
                start: 10,
                count: 4,
                next_count: 2
            }
        );
        let retry = RetryPolicy::from(&config.fetch);
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.initial_delay, Duration::from_millis(200));
        assert_eq!(retry.max_delay, Duration::from_secs(1));
        assert_eq!(retry.strategy, BackoffStrategy::ExponentialWithJitter);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = MamConfig::from_toml_str("[fetch]\nbackoff = \"linear\"\n").unwrap();
        assert_eq!(config.fetch.backoff, BackoffStrategy::Linear);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.channel, ChannelConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            MamConfig::from_toml_str("[channel]\nsecurty = 2\n"),
            Err(MamError::Config(_))
        ));
        assert!(matches!(
            MamConfig::from_toml_str("[fetch]\nbackoff = \"forever\"\n"),
            Err(MamError::Config(_))
        ));
    }
}
