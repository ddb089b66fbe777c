use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::moderation::{ConfirmOptions, StoreOptions, TransitionPolicy};
use crate::kernel::RetryPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cache_ttl: Duration,
    pub confirm_timeout: Duration,
    pub confirm_interval: Duration,
    pub connect_attempts: u32,
    pub connect_backoff: Duration,
    pub connect_max_backoff: Duration,
    pub event_capacity: usize,
    pub strict_transitions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            confirm_timeout: Duration::from_millis(5_000),
            confirm_interval: Duration::from_millis(100),
            connect_attempts: 5,
            connect_backoff: Duration::from_millis(200),
            connect_max_backoff: Duration::from_millis(5_000),
            event_capacity: 256,
            strict_transitions: false,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid value, got {raw:?}")),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let millis = |d: Duration| d.as_millis() as u64;

        Ok(Self {
            cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "MARKETPLACE_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            confirm_timeout: Duration::from_millis(parse_or(
                &lookup,
                "MARKETPLACE_CONFIRM_TIMEOUT_MS",
                millis(defaults.confirm_timeout),
            )?),
            confirm_interval: Duration::from_millis(parse_or(
                &lookup,
                "MARKETPLACE_CONFIRM_INTERVAL_MS",
                millis(defaults.confirm_interval),
            )?),
            connect_attempts: parse_or(
                &lookup,
                "MARKETPLACE_CONNECT_ATTEMPTS",
                defaults.connect_attempts,
            )?,
            connect_backoff: Duration::from_millis(parse_or(
                &lookup,
                "MARKETPLACE_CONNECT_BACKOFF_MS",
                millis(defaults.connect_backoff),
            )?),
            connect_max_backoff: Duration::from_millis(parse_or(
                &lookup,
                "MARKETPLACE_CONNECT_MAX_BACKOFF_MS",
                millis(defaults.connect_max_backoff),
            )?),
            event_capacity: parse_or(
                &lookup,
                "MARKETPLACE_EVENT_CAPACITY",
                defaults.event_capacity,
            )?,
            strict_transitions: parse_or(
                &lookup,
                "MARKETPLACE_STRICT_TRANSITIONS",
                defaults.strict_transitions,
            )?,
        })
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.strict_transitions {
            TransitionPolicy::strict()
        } else {
            TransitionPolicy::Unrestricted
        }
    }

    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions::builder()
            .timeout(self.confirm_timeout)
            .interval(self.confirm_interval)
            .build()
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::builder()
            .cache_ttl(self.cache_ttl)
            .policy(self.transition_policy())
            .confirm(self.confirm_options())
            .event_capacity(self.event_capacity)
            .build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_attempts(self.connect_attempts)
            .initial_backoff(self.connect_backoff)
            .max_backoff(self.connect_max_backoff)
            .build()
    }
}
