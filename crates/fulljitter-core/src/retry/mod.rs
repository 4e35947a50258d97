//! Delay strategies and the timers that drive them.
//!
//! # Key Types
//!
//! - [`DelayStrategy`] - `(attempt, last_error) -> Duration`, the extension point
//! - [`ExponentialDelayStrategy`] - capped exponential growth with full jitter
//! - [`RetryTimer`] - attempt counter bound to a strategy
//! - [`ExponentialTimer`] - a [`RetryTimer`] bound to the exponential strategy
//!
//! # Examples
//!
//! ```rust
//! use fulljitter_core::retry::{ExponentialStrategyConfig, ExponentialTimer};
//! use std::time::Duration;
//!
//! let config = ExponentialStrategyConfig::builder()
//!     .base(Duration::from_millis(200))
//!     .max_duration(Duration::from_secs(20))
//!     .build()
//!     .unwrap();
//! let mut timer = ExponentialTimer::with_config(config);
//!
//! let err = std::io::Error::other("connection refused");
//! let wait = timer.next_interval(Some(&err));
//! assert!(wait < Duration::from_millis(200));
//! ```

mod exponential;
mod strategy;
mod timer;

pub use exponential::{
    DEFAULT_BASE, DEFAULT_GROWTH_BASE, DEFAULT_MAX_DURATION, ExponentialDelayStrategy,
    ExponentialStrategyConfig, ExponentialStrategyConfigBuilder,
};
pub use strategy::{ConstantDelayStrategy, DelayStrategy};
pub use timer::{ExponentialTimer, RetryTimer};
