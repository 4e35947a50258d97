//! The pluggable delay strategy.

use std::error::Error;
use std::time::Duration;

/// Computes how long to wait before the next attempt of a failed operation.
///
/// A strategy is a pure mapping from the number of prior failed attempts
/// (and, optionally, the most recent error) to a wait duration. It holds no
/// per-sequence state, so one strategy can back any number of
/// [`RetryTimer`](super::RetryTimer)s.
///
/// Any `Fn(u32, Option<&dyn Error>) -> Duration + Send + Sync` closure is a
/// strategy, which is usually the quickest way to plug in a custom policy.
///
/// # Examples
///
/// A strategy that waits longer when the error says the caller was
/// throttled:
///
/// ```rust
/// use fulljitter_core::retry::{DelayStrategy, RetryTimer};
/// use std::error::Error;
/// use std::time::Duration;
///
/// struct ThrottleAware;
///
/// impl DelayStrategy for ThrottleAware {
///     fn compute_delay(&self, attempt: u32, last_error: Option<&dyn Error>) -> Duration {
///         let base = Duration::from_millis(100) * (attempt + 1);
///         match last_error {
///             Some(err) if err.to_string().contains("throttled") => base * 10,
///             _ => base,
///         }
///     }
/// }
///
/// let mut timer = RetryTimer::new(ThrottleAware);
/// let throttled = std::io::Error::other("throttled");
/// assert_eq!(timer.next_interval(Some(&throttled)), Duration::from_secs(1));
/// assert_eq!(timer.next_interval(None), Duration::from_millis(200));
/// ```
pub trait DelayStrategy: Send + Sync {
    /// Compute the delay before the next attempt.
    ///
    /// # Parameters
    /// - `attempt`: number of prior failed attempts (0 before the first retry)
    /// - `last_error`: the most recent error, opaque to the timer
    fn compute_delay(&self, attempt: u32, last_error: Option<&dyn Error>) -> Duration;

    /// The attempt number past which the delay distribution no longer changes.
    ///
    /// Timers stop advancing their counter shortly after this point. `None`
    /// (the default) means the strategy may keep changing with every attempt
    /// and the counter only saturates at `u32::MAX`.
    fn saturation_attempt(&self) -> Option<u32> {
        None
    }
}

impl<F> DelayStrategy for F
where
    F: Fn(u32, Option<&dyn Error>) -> Duration + Send + Sync,
{
    fn compute_delay(&self, attempt: u32, last_error: Option<&dyn Error>) -> Duration {
        self(attempt, last_error)
    }
}

/// Waits the same duration before every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantDelayStrategy {
    delay: Duration,
}

impl ConstantDelayStrategy {
    /// Create a strategy that always returns `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The fixed delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl DelayStrategy for ConstantDelayStrategy {
    fn compute_delay(&self, _attempt: u32, _last_error: Option<&dyn Error>) -> Duration {
        self.delay
    }

    fn saturation_attempt(&self) -> Option<u32> {
        Some(0)
    }
}
