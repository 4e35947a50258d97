#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Async retry loop on top of `fulljitter-core` timers.
//!
//! The core timers only compute how long to wait. [`Retrier`] is the
//! caller side: it runs an operation, sleeps with `tokio::time::sleep`
//! between failures, and resets its timer once the loop ends.
//!
//! # Examples
//!
//! ```rust
//! use fulljitter_retry::Retrier;
//! use fulljitter_core::{ExponentialStrategyConfig, ExponentialTimer};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExponentialStrategyConfig::builder()
//!     .base(Duration::from_millis(1))
//!     .max_duration(Duration::from_millis(10))
//!     .build()?;
//! let mut retrier = Retrier::new(ExponentialTimer::with_config(config)).max_retries(5);
//!
//! let calls = &AtomicU32::new(0);
//! let value = retrier
//!     .run(|| async move {
//!         if calls.fetch_add(1, Ordering::SeqCst) < 2 {
//!             Err(std::io::Error::other("flaky"))
//!         } else {
//!             Ok(42)
//!         }
//!     })
//!     .await?;
//!
//! assert_eq!(value, 42);
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::RetryError;

use fulljitter_core::RetryTimer;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

type RetryPredicate = Arc<dyn Fn(&(dyn Error + 'static), u32) -> bool + Send + Sync>;

/// Runs an async operation until it succeeds, sleeping between failures for
/// whatever its [`RetryTimer`] says.
///
/// By default every error is retried and there is no retry limit.
pub struct Retrier {
    timer: RetryTimer,
    max_retries: Option<u32>,
    should_retry: RetryPredicate,
}

impl Retrier {
    /// Create a retrier around `timer`.
    ///
    /// Accepts a [`RetryTimer`] or anything that converts into one, such as
    /// an [`ExponentialTimer`](fulljitter_core::ExponentialTimer).
    pub fn new(timer: impl Into<RetryTimer>) -> Self {
        Self {
            timer: timer.into(),
            max_retries: None,
            should_retry: Arc::new(|_: &(dyn Error + 'static), _: u32| true),
        }
    }

    /// Give up after `max_retries` retries (`max_retries + 1` attempts).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Only retry errors for which `predicate(error, retries_so_far)` holds.
    ///
    /// The error is `'static`, so the predicate can `downcast_ref` it.
    ///
    /// ```rust
    /// use fulljitter_core::{ConstantDelayStrategy, RetryTimer};
    /// use fulljitter_retry::Retrier;
    /// use std::time::Duration;
    ///
    /// let retrier = Retrier::new(RetryTimer::new(ConstantDelayStrategy::new(Duration::from_millis(5))))
    ///     .retry_if(|err, _retries| err.to_string().contains("network"));
    /// ```
    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&(dyn Error + 'static), u32) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(predicate);
        self
    }

    /// The timer driving this retrier.
    pub fn timer(&self) -> &RetryTimer {
        &self.timer
    }

    /// Run `operation` until it succeeds or the retrier gives up.
    ///
    /// The timer is reset when the run ends, whatever the outcome, so the
    /// retrier can be reused for the next sequence. This includes dropping
    /// the future mid-sleep, as `tokio::time::timeout` or `select!` do.
    ///
    /// # Errors
    ///
    /// - [`RetryError::NotRetryable`] when the predicate rejects an error
    /// - [`RetryError::Exhausted`] when the retry limit is reached
    pub async fn run<F, Fut, T, E>(&mut self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        let timer = ResetOnDrop(&mut self.timer);
        let mut retries = 0u32;

        loop {
            match operation().await {
                Ok(value) => {
                    if retries > 0 {
                        debug!(retries, "operation succeeded after retrying");
                    }
                    break Ok(value);
                }
                Err(err) if !(self.should_retry)(&err as &(dyn Error + 'static), retries) => {
                    warn!(retries, error = %err, "giving up on non-retryable error");
                    break Err(RetryError::NotRetryable(err));
                }
                Err(err) if self.max_retries.is_some_and(|max| retries >= max) => {
                    warn!(retries, error = %err, "retry limit reached, giving up");
                    break Err(RetryError::Exhausted {
                        attempts: retries.saturating_add(1),
                        source: err,
                    });
                }
                Err(err) => {
                    let delay = timer.0.next_interval(Some(&err));
                    debug!(
                        retry = retries + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retries = retries.saturating_add(1);
                }
            }
        }
    }
}

/// Resets the borrowed timer when a run finishes or is cancelled.
struct ResetOnDrop<'a>(&'a mut RetryTimer);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.reset();
    }
}

impl fmt::Debug for Retrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("timer", &self.timer)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
