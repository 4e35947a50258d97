//! Serializable backoff settings for embedding in a caller's config file.

use crate::error::ConfigError;
use crate::retry::{ExponentialStrategyConfig, ExponentialStrategyConfigBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff settings in config-file form.
///
/// Every field is optional when deserializing; missing fields take the
/// defaults of [`ExponentialStrategyConfig`].
///
/// # Examples
///
/// ```rust
/// use fulljitter_core::{ExponentialSettings, ExponentialTimer};
///
/// let settings: ExponentialSettings = serde_json::from_str(r#"{ "base_ms": 250 }"#).unwrap();
/// assert_eq!(settings.max_ms, 120_000);
///
/// let timer = ExponentialTimer::from_settings(settings).unwrap();
/// assert_eq!(timer.next_ceiling().as_millis(), 250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExponentialSettings {
    /// Unit base delay in milliseconds.
    pub base_ms: u64,

    /// Hard ceiling in milliseconds.
    pub max_ms: u64,

    /// Exponential growth base.
    pub growth_base: u32,

    /// Fixed jitter seed. Unset means seeded from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ExponentialSettings {
    fn default() -> Self {
        Self {
            base_ms: 1_000,
            max_ms: 120_000,
            growth_base: 2,
            seed: None,
        }
    }
}

impl ExponentialSettings {
    fn builder(&self) -> ExponentialStrategyConfigBuilder {
        let builder = ExponentialStrategyConfig::builder()
            .base(Duration::from_millis(self.base_ms))
            .max_duration(Duration::from_millis(self.max_ms))
            .growth_base(self.growth_base);

        match self.seed {
            Some(seed) => builder.seed(seed),
            None => builder,
        }
    }
}

impl TryFrom<ExponentialSettings> for ExponentialStrategyConfig {
    type Error = ConfigError;

    fn try_from(settings: ExponentialSettings) -> Result<Self, Self::Error> {
        settings.builder().build()
    }
}
