#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry-backoff timers for any retrying caller.
//!
//! This crate computes how long a caller should wait before retrying a
//! failed operation. It never sleeps and never performs I/O: the caller
//! asks for a duration, waits however it likes, and reports success by
//! resetting the timer.
//!
//! - **Pluggable delay strategies** via the [`DelayStrategy`] trait
//!   (closures implement it too)
//! - **Capped exponential backoff with full jitter** via
//!   [`ExponentialDelayStrategy`]
//! - **Attempt tracking** via [`RetryTimer`] and its exponential
//!   composition [`ExponentialTimer`]
//! - **Explicit randomness** via [`RandomSource`], seedable for
//!   deterministic tests
//! - **Config-file settings** via [`ExponentialSettings`]
//!
//! Enable the `tracing` feature to log computed intervals and resets.
//!
//! # Examples
//!
//! ```rust
//! use fulljitter_core::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), fulljitter_core::ConfigError> {
//! let config = ExponentialStrategyConfig::builder()
//!     .base(Duration::from_millis(100))
//!     .max_duration(Duration::from_secs(10))
//!     .seed(7)
//!     .build()?;
//!
//! let mut timer = ExponentialTimer::with_config(config);
//! let wait = timer.next_interval(None);
//! assert!(wait < Duration::from_millis(100));
//! assert_eq!(timer.attempt(), 1);
//!
//! timer.reset();
//! assert_eq!(timer.attempt(), 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod random;
pub mod retry;

pub use config::ExponentialSettings;
pub use error::ConfigError;
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use retry::{
    ConstantDelayStrategy, DelayStrategy, ExponentialDelayStrategy, ExponentialStrategyConfig,
    ExponentialStrategyConfigBuilder, ExponentialTimer, RetryTimer,
};

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use fulljitter_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ExponentialSettings;
    pub use crate::error::ConfigError;
    pub use crate::random::{RandomSource, SeededRandom, ThreadRandom};
    pub use crate::retry::{
        ConstantDelayStrategy, DelayStrategy, ExponentialDelayStrategy, ExponentialStrategyConfig,
        ExponentialTimer, RetryTimer,
    };
}
