//! Attempt-tracking timers.

use super::exponential::{ExponentialDelayStrategy, ExponentialStrategyConfig};
use super::strategy::DelayStrategy;
use crate::config::ExponentialSettings;
use crate::error::Result;
use std::error::Error;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Tracks the attempts of one retry sequence and asks a [`DelayStrategy`]
/// how long to wait before each retry.
///
/// The timer is `Fresh` while its counter sits at the starting value and
/// `Retrying` once [`next_interval`](Self::next_interval) has advanced it.
/// [`reset`](Self::reset) returns it to `Fresh`; there is no terminal state.
///
/// The timer only computes durations. It never sleeps, so the caller picks
/// how to wait and whether to abandon the wait. Advancing takes `&mut self`:
/// give each retry sequence its own timer, or wrap a shared one in a lock.
///
/// The counter never exceeds one past the strategy's
/// [`saturation_attempt`](DelayStrategy::saturation_attempt), beyond which
/// the delay distribution no longer changes.
///
/// # Examples
///
/// ```rust
/// use fulljitter_core::retry::{ConstantDelayStrategy, RetryTimer};
/// use std::time::Duration;
///
/// let mut timer = RetryTimer::new(ConstantDelayStrategy::new(Duration::from_millis(50)));
///
/// for _ in 0..3 {
///     match std::fs::metadata("/definitely/not/here") {
///         Ok(_) => {
///             timer.reset();
///             break;
///         }
///         Err(err) => {
///             let wait = timer.next_interval(Some(&err));
///             // std::thread::sleep(wait) or tokio::time::sleep(wait).await
///             assert_eq!(wait, Duration::from_millis(50));
///         }
///     }
/// }
/// assert!(!timer.is_fresh());
/// ```
#[derive(Clone)]
pub struct RetryTimer {
    strategy: Arc<dyn DelayStrategy>,
    attempt: u32,
    starting_value: u32,
}

impl RetryTimer {
    /// Create a timer that owns `strategy`.
    pub fn new(strategy: impl DelayStrategy + 'static) -> Self {
        Self::from_shared(Arc::new(strategy))
    }

    /// Create a timer backed by a strategy other timers may also use.
    pub fn from_shared(strategy: Arc<dyn DelayStrategy>) -> Self {
        Self {
            strategy,
            attempt: 0,
            starting_value: 0,
        }
    }

    /// Create a timer from a closure.
    ///
    /// ```rust
    /// use fulljitter_core::retry::RetryTimer;
    /// use std::time::Duration;
    ///
    /// let mut timer = RetryTimer::from_fn(|attempt, _err| Duration::from_secs(u64::from(attempt) + 1));
    /// assert_eq!(timer.next_interval(None), Duration::from_secs(1));
    /// assert_eq!(timer.next_interval(None), Duration::from_secs(2));
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u32, Option<&dyn Error>) -> Duration + Send + Sync + 'static,
    {
        Self::new(f)
    }

    /// Start counting from `starting_value` instead of 0.
    ///
    /// [`reset`](Self::reset) returns the counter to this value.
    pub fn with_starting_value(mut self, starting_value: u32) -> Self {
        self.starting_value = starting_value;
        self.attempt = starting_value;
        self
    }

    /// Compute the wait before the next attempt and advance the counter.
    ///
    /// The strategy sees the counter value from before the advance, so the
    /// first call on a fresh timer asks for attempt `starting_value`.
    /// `last_error` is passed through untouched.
    pub fn next_interval(&mut self, last_error: Option<&dyn Error>) -> Duration {
        let attempt = self.attempt;
        let delay = self.strategy.compute_delay(attempt, last_error);
        self.advance();

        #[cfg(feature = "tracing")]
        trace!(attempt, delay_ms = saturating_millis(delay), "computed retry interval");
        delay
    }

    /// Return the counter to its starting value after a success.
    pub fn reset(&mut self) {
        #[cfg(feature = "tracing")]
        if self.attempt != self.starting_value {
            debug!(
                attempts = self.attempt - self.starting_value,
                "resetting retry timer"
            );
        }
        self.attempt = self.starting_value;
    }

    /// The current attempt counter.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The value the counter starts from and resets to.
    pub fn starting_value(&self) -> u32 {
        self.starting_value
    }

    /// `true` until the first [`next_interval`](Self::next_interval) after
    /// construction or reset.
    pub fn is_fresh(&self) -> bool {
        self.attempt == self.starting_value
    }

    /// The strategy this timer delegates to.
    pub fn strategy(&self) -> &Arc<dyn DelayStrategy> {
        &self.strategy
    }

    fn advance(&mut self) {
        let next = self.attempt.saturating_add(1);
        self.attempt = match self.strategy.saturation_attempt() {
            Some(limit) => next.min(limit.max(self.starting_value).saturating_add(1)),
            None => next,
        };
    }
}

/// Milliseconds for log fields, pinned at `u64::MAX` for delays past ~584 million years.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn saturating_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

impl fmt::Debug for RetryTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryTimer")
            .field("attempt", &self.attempt)
            .field("starting_value", &self.starting_value)
            .finish_non_exhaustive()
    }
}

/// A [`RetryTimer`] bound to an [`ExponentialDelayStrategy`].
///
/// Dereferences to the inner [`RetryTimer`], so `next_interval`, `reset`,
/// and `attempt` are available directly.
///
/// # Examples
///
/// ```rust
/// use fulljitter_core::retry::ExponentialTimer;
/// use std::time::Duration;
///
/// // growth base 2, base 1s, cap 120s, entropy-seeded jitter
/// let mut timer = ExponentialTimer::new();
///
/// let first = timer.next_interval(None);
/// assert!(first < Duration::from_secs(1));
///
/// let second = timer.next_interval(None);
/// assert!(second < Duration::from_secs(2));
///
/// timer.reset();
/// assert!(timer.is_fresh());
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialTimer {
    timer: RetryTimer,
    strategy: Arc<ExponentialDelayStrategy>,
}

impl ExponentialTimer {
    /// Create a timer with the default config.
    pub fn new() -> Self {
        Self::with_config(ExponentialStrategyConfig::default())
    }

    /// Create a timer with a custom config.
    pub fn with_config(config: ExponentialStrategyConfig) -> Self {
        let strategy = Arc::new(ExponentialDelayStrategy::new(config));
        let timer = RetryTimer::from_shared(Arc::clone(&strategy) as Arc<dyn DelayStrategy>);
        Self { timer, strategy }
    }

    /// Create a timer from config-file settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when the settings
    /// describe a degenerate backoff.
    pub fn from_settings(settings: ExponentialSettings) -> Result<Self> {
        let config = ExponentialStrategyConfig::try_from(settings)?;
        Ok(Self::with_config(config))
    }

    /// The bound exponential strategy.
    pub fn strategy(&self) -> &ExponentialDelayStrategy {
        &self.strategy
    }

    /// The unjittered ceiling for the next call to `next_interval`.
    pub fn next_ceiling(&self) -> Duration {
        self.strategy.ceiling(self.timer.attempt())
    }

    /// Unwrap into the generic timer.
    pub fn into_inner(self) -> RetryTimer {
        self.timer
    }
}

impl Default for ExponentialTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for ExponentialTimer {
    type Target = RetryTimer;

    fn deref(&self) -> &RetryTimer {
        &self.timer
    }
}

impl DerefMut for ExponentialTimer {
    fn deref_mut(&mut self) -> &mut RetryTimer {
        &mut self.timer
    }
}

impl From<ExponentialTimer> for RetryTimer {
    fn from(timer: ExponentialTimer) -> Self {
        timer.into_inner()
    }
}
