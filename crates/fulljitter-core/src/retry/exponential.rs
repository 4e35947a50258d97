//! Capped exponential backoff with full jitter.

use super::strategy::DelayStrategy;
use crate::error::{ConfigError, Result};
use crate::random::{RandomSource, SeededRandom};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default hard ceiling for any computed delay.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(120);

/// Default growth base (delays double).
pub const DEFAULT_GROWTH_BASE: u32 = 2;

/// Default unit base delay, the ceiling before the first retry.
pub const DEFAULT_BASE: Duration = Duration::from_secs(1);

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parameters for [`ExponentialDelayStrategy`].
///
/// The unjittered ceiling for attempt `n` is `base * growth_base^n`, clamped
/// to `max_duration`. Immutable once built.
///
/// Cloning shares the random source. Every [`RandomSource`] is safe to
/// sample concurrently, but timers that should produce independent
/// sequences each need their own config.
#[derive(Clone)]
pub struct ExponentialStrategyConfig {
    max_duration: Duration,
    growth_base: u32,
    base: Duration,
    random: Arc<dyn RandomSource>,
}

impl ExponentialStrategyConfig {
    /// Create a new builder for the config.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fulljitter_core::retry::ExponentialStrategyConfig;
    /// use std::time::Duration;
    ///
    /// let config = ExponentialStrategyConfig::builder()
    ///     .base(Duration::from_millis(500))
    ///     .max_duration(Duration::from_secs(30))
    ///     .growth_base(3)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.growth_base(), 3);
    /// ```
    pub fn builder() -> ExponentialStrategyConfigBuilder {
        ExponentialStrategyConfigBuilder::default()
    }

    /// The hard ceiling for any computed delay.
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// The exponential growth base.
    pub fn growth_base(&self) -> u32 {
        self.growth_base
    }

    /// The unit base delay.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// The random source used for jitter.
    pub fn random(&self) -> &Arc<dyn RandomSource> {
        &self.random
    }
}

impl Default for ExponentialStrategyConfig {
    /// Defaults:
    /// - `max_duration`: 120s
    /// - `growth_base`: 2
    /// - `base`: 1s
    /// - `random`: a [`SeededRandom`] seeded from OS entropy, unique to this config
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_MAX_DURATION,
            growth_base: DEFAULT_GROWTH_BASE,
            base: DEFAULT_BASE,
            random: Arc::new(SeededRandom::from_entropy()),
        }
    }
}

impl fmt::Debug for ExponentialStrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialStrategyConfig")
            .field("max_duration", &self.max_duration)
            .field("growth_base", &self.growth_base)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExponentialStrategyConfig`].
///
/// Unset parameters fall back to the defaults. `build` rejects values that
/// would collapse every delay to zero.
#[derive(Default)]
pub struct ExponentialStrategyConfigBuilder {
    max_duration: Option<Duration>,
    growth_base: Option<u32>,
    base: Option<Duration>,
    random: Option<Arc<dyn RandomSource>>,
}

impl ExponentialStrategyConfigBuilder {
    /// Set the hard ceiling for any computed delay.
    ///
    /// Default: 120s
    pub fn max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    /// Set the exponential growth base.
    ///
    /// Default: 2
    pub fn growth_base(mut self, growth_base: u32) -> Self {
        self.growth_base = Some(growth_base);
        self
    }

    /// Set the unit base delay, which is the ceiling before the first retry.
    ///
    /// Default: 1s
    pub fn base(mut self, base: Duration) -> Self {
        self.base = Some(base);
        self
    }

    /// Use `random` as the jitter source.
    pub fn random(self, random: impl RandomSource + 'static) -> Self {
        self.shared_random(Arc::new(random))
    }

    /// Use a source that other configs may also hold.
    pub fn shared_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Use a [`SeededRandom`] with a fixed seed, for reproducible delays.
    pub fn seed(self, seed: u64) -> Self {
        self.random(SeededRandom::from_seed(seed))
    }

    /// Validate and build the config.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroBase`] when `base` is zero
    /// - [`ConfigError::ZeroMaxDuration`] when `max_duration` is zero
    /// - [`ConfigError::ZeroGrowthBase`] when `growth_base` is zero
    pub fn build(self) -> Result<ExponentialStrategyConfig> {
        let max_duration = self.max_duration.unwrap_or(DEFAULT_MAX_DURATION);
        let growth_base = self.growth_base.unwrap_or(DEFAULT_GROWTH_BASE);
        let base = self.base.unwrap_or(DEFAULT_BASE);

        if base.is_zero() {
            return Err(ConfigError::ZeroBase);
        }
        if max_duration.is_zero() {
            return Err(ConfigError::ZeroMaxDuration);
        }
        if growth_base == 0 {
            return Err(ConfigError::ZeroGrowthBase);
        }

        Ok(ExponentialStrategyConfig {
            max_duration,
            growth_base,
            base,
            random: self
                .random
                .unwrap_or_else(|| Arc::new(SeededRandom::from_entropy())),
        })
    }
}

/// Exponential backoff with "full jitter".
///
/// For attempt `n` (the number of prior failures):
///
/// ```text
/// ceiling = min(base * growth_base^n, max_duration)
/// delay   = uniform sample from [0, ceiling)
/// ```
///
/// The ceiling is computed with saturating integer arithmetic, so a huge
/// exponent clamps to `max_duration` rather than wrapping to a short wait.
/// Every call draws a fresh sample.
///
/// See <https://aws.amazon.com/blogs/architecture/exponential-backoff-and-jitter/>.
///
/// # Examples
///
/// ```rust
/// use fulljitter_core::retry::{DelayStrategy, ExponentialDelayStrategy, ExponentialStrategyConfig};
/// use std::time::Duration;
///
/// let config = ExponentialStrategyConfig::builder()
///     .max_duration(Duration::from_secs(5))
///     .seed(1)
///     .build()
///     .unwrap();
/// let strategy = ExponentialDelayStrategy::new(config);
///
/// assert_eq!(strategy.ceiling(2), Duration::from_secs(4));
/// assert_eq!(strategy.ceiling(10), Duration::from_secs(5));
/// assert!(strategy.compute_delay(10, None) < Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialDelayStrategy {
    config: ExponentialStrategyConfig,
    saturation: u32,
}

impl ExponentialDelayStrategy {
    /// Create a strategy from a config.
    pub fn new(config: ExponentialStrategyConfig) -> Self {
        let mut strategy = Self {
            config,
            saturation: 0,
        };
        strategy.saturation = strategy.first_capped_attempt();
        strategy
    }

    /// The config this strategy was built from.
    pub fn config(&self) -> &ExponentialStrategyConfig {
        &self.config
    }

    /// The unjittered ceiling for `attempt`, clamped to `max_duration`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let max = self.config.max_duration;
        let nanos = u128::from(self.config.growth_base)
            .checked_pow(attempt)
            .and_then(|factor| self.config.base.as_nanos().checked_mul(factor));

        match nanos {
            Some(nanos) if nanos < max.as_nanos() => duration_from_nanos(nanos),
            _ => max,
        }
    }

    // Smallest attempt whose ceiling no longer grows.
    fn first_capped_attempt(&self) -> u32 {
        if self.config.growth_base <= 1 {
            return 0;
        }
        let max = self.config.max_duration;
        let mut attempt = 0;
        while attempt < u32::MAX && self.ceiling(attempt) < max {
            attempt += 1;
        }
        attempt
    }
}

impl DelayStrategy for ExponentialDelayStrategy {
    fn compute_delay(&self, attempt: u32, _last_error: Option<&dyn Error>) -> Duration {
        let ceiling = self.ceiling(attempt);
        // Only reachable through a config built without the validating builder
        if ceiling.is_zero() {
            return Duration::ZERO;
        }
        // Ceilings beyond ~584 years are sampled over the u64 nanosecond range
        let bound = u64::try_from(ceiling.as_nanos()).unwrap_or(u64::MAX);
        Duration::from_nanos(self.config.random.below(bound))
    }

    fn saturation_attempt(&self) -> Option<u32> {
        Some(self.saturation)
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    // Callers only pass values below an existing Duration, so secs fits in u64
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::MockRandomSource;
    use rstest::rstest;

    fn build_strategy(base: Duration, growth_base: u32, max: Duration) -> ExponentialDelayStrategy {
        ExponentialDelayStrategy::new(
            ExponentialStrategyConfig::builder()
                .base(base)
                .growth_base(growth_base)
                .max_duration(max)
                .seed(0)
                .build()
                .unwrap(),
        )
    }

    #[rstest]
    #[case(0, Duration::from_secs(1))]
    #[case(1, Duration::from_secs(2))]
    #[case(2, Duration::from_secs(4))]
    #[case(3, Duration::from_secs(8))]
    #[case(6, Duration::from_secs(64))]
    #[case(7, Duration::from_secs(120))]
    #[case(10, Duration::from_secs(120))]
    fn test_default_ceilings(#[case] attempt: u32, #[case] expected: Duration) {
        let strategy = ExponentialDelayStrategy::new(ExponentialStrategyConfig::default());
        assert_eq!(strategy.ceiling(attempt), expected);
    }

    #[test]
    fn test_ceiling_clamped_to_max() {
        let strategy = build_strategy(Duration::from_secs(1), 2, Duration::from_secs(5));

        assert_eq!(strategy.ceiling(2), Duration::from_secs(4));
        assert_eq!(strategy.ceiling(3), Duration::from_secs(5));
        assert_eq!(strategy.ceiling(10), Duration::from_secs(5));
    }

    #[test]
    fn test_overflow_saturates_to_max() {
        let max = Duration::from_secs(3_600);
        let strategy = build_strategy(Duration::from_secs(1), 10, max);

        // 10^40 overflows u128 nanoseconds
        assert_eq!(strategy.ceiling(40), max);
        assert_eq!(strategy.ceiling(u32::MAX), max);

        let huge = build_strategy(Duration::MAX, u32::MAX, Duration::MAX);
        assert_eq!(huge.ceiling(5), Duration::MAX);
        assert!(huge.compute_delay(5, None) < Duration::MAX);
    }

    #[test]
    fn test_growth_base_one_is_flat() {
        let strategy = build_strategy(Duration::from_millis(300), 1, Duration::from_secs(10));

        assert_eq!(strategy.ceiling(0), Duration::from_millis(300));
        assert_eq!(strategy.ceiling(1_000), Duration::from_millis(300));
        assert_eq!(strategy.saturation_attempt(), Some(0));
    }

    #[test]
    fn test_sub_second_base() {
        let strategy = build_strategy(Duration::from_millis(150), 3, Duration::from_secs(60));

        assert_eq!(strategy.ceiling(0), Duration::from_millis(150));
        assert_eq!(strategy.ceiling(1), Duration::from_millis(450));
        assert_eq!(strategy.ceiling(2), Duration::from_millis(1_350));
    }

    #[rstest]
    #[case(Duration::from_secs(1), 2, Duration::from_secs(120), 7)]
    #[case(Duration::from_secs(1), 2, Duration::from_secs(5), 3)]
    #[case(Duration::from_secs(1), 2, Duration::from_secs(4), 2)]
    #[case(Duration::from_secs(10), 2, Duration::from_secs(5), 0)]
    #[case(Duration::from_millis(1), 10, Duration::from_secs(1), 3)]
    fn test_saturation_attempt(
        #[case] base: Duration,
        #[case] growth_base: u32,
        #[case] max: Duration,
        #[case] expected: u32,
    ) {
        let strategy = build_strategy(base, growth_base, max);
        assert_eq!(strategy.saturation_attempt(), Some(expected));
        assert_eq!(strategy.ceiling(expected), max);
        if expected > 0 {
            assert!(strategy.ceiling(expected - 1) < max);
        }
    }

    #[test]
    fn test_delay_sampled_below_ceiling() {
        let mut random = MockRandomSource::new();
        random
            .expect_below()
            .withf(|bound| *bound == 4_000_000_000)
            .times(1)
            .return_const(1_500_000_000u64);

        let config = ExponentialStrategyConfig::builder()
            .random(random)
            .build()
            .unwrap();
        let strategy = ExponentialDelayStrategy::new(config);

        assert_eq!(strategy.compute_delay(2, None), Duration::from_millis(1_500));
    }

    #[test]
    fn test_zero_ceiling_skips_sampling() {
        let mut random = MockRandomSource::new();
        random.expect_below().never();

        let strategy = ExponentialDelayStrategy::new(ExponentialStrategyConfig {
            max_duration: Duration::ZERO,
            growth_base: 2,
            base: Duration::ZERO,
            random: Arc::new(random),
        });

        assert_eq!(strategy.saturation_attempt(), Some(0));
        assert_eq!(strategy.compute_delay(0, None), Duration::ZERO);
        assert_eq!(strategy.compute_delay(9, None), Duration::ZERO);
    }

    #[test]
    fn test_every_call_resamples() {
        let mut random = MockRandomSource::new();
        let mut next = 0u64;
        random.expect_below().times(3).returning(move |_| {
            next += 1;
            next
        });

        let config = ExponentialStrategyConfig::builder()
            .random(random)
            .build()
            .unwrap();
        let strategy = ExponentialDelayStrategy::new(config);

        let delays: Vec<_> = (0..3).map(|_| strategy.compute_delay(0, None)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_nanos(1),
                Duration::from_nanos(2),
                Duration::from_nanos(3)
            ]
        );
    }

    #[test]
    fn test_error_is_ignored() {
        let a = build_strategy(Duration::from_secs(1), 2, Duration::from_secs(60));
        let b = build_strategy(Duration::from_secs(1), 2, Duration::from_secs(60));
        let err = std::io::Error::other("throttled");

        for attempt in 0..8 {
            assert_eq!(
                a.compute_delay(attempt, Some(&err)),
                b.compute_delay(attempt, None)
            );
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = ExponentialStrategyConfig::builder().build().unwrap();

        assert_eq!(config.max_duration(), Duration::from_secs(120));
        assert_eq!(config.growth_base(), 2);
        assert_eq!(config.base(), Duration::from_secs(1));
    }

    #[test]
    fn test_builder_rejects_degenerate_values() {
        let zero_base = ExponentialStrategyConfig::builder()
            .base(Duration::ZERO)
            .build();
        assert_eq!(zero_base.unwrap_err(), ConfigError::ZeroBase);

        let zero_max = ExponentialStrategyConfig::builder()
            .max_duration(Duration::ZERO)
            .build();
        assert_eq!(zero_max.unwrap_err(), ConfigError::ZeroMaxDuration);

        let zero_growth = ExponentialStrategyConfig::builder().growth_base(0).build();
        assert_eq!(zero_growth.unwrap_err(), ConfigError::ZeroGrowthBase);
    }

    #[test]
    fn test_debug_omits_random_source() {
        let config = ExponentialStrategyConfig::default();
        let debug = format!("{config:?}");

        assert!(debug.contains("max_duration"));
        assert!(debug.ends_with(".. }"));
    }

    #[test]
    fn test_shared_random_is_shared() {
        let random: Arc<dyn RandomSource> = Arc::new(SeededRandom::from_seed(3));
        let config = ExponentialStrategyConfig::builder()
            .shared_random(Arc::clone(&random))
            .build()
            .unwrap();

        assert!(Arc::ptr_eq(config.random(), &random));
    }
}
