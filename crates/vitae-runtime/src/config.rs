//! Runtime configuration.
//!
//! Everything here deserializes with per-field defaults so a partial YAML
//! document configures only what it names. Durations are integer
//! milliseconds on the wire.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::resilience::RetryPolicy;

/// Serialize/deserialize a `Duration` as integer milliseconds.
pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Errors loading runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Backoff base delay
    #[serde(with = "duration_millis")]
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new(config.max_retries, config.base_delay)
    }
}

/// Throttle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum gap between operation starts
    #[serde(with = "duration_millis")]
    pub min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(2000),
        }
    }
}

/// Which providers fill the primary and secondary slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSelection {
    /// Provider type name for the primary slot (registry key)
    pub primary: String,

    /// Provider type name for the secondary slot
    pub secondary: String,
}

impl Default for ProviderSelection {
    fn default() -> Self {
        Self {
            primary: "bedrock".to_string(),
            secondary: "openai".to_string(),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub throttle: ThrottleConfig,

    #[serde(default)]
    pub providers: ProviderSelection,
}

impl RuntimeConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
