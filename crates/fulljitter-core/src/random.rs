//! Bounded random sampling used to jitter delays.
//!
//! Randomness is an explicit dependency of every exponential strategy.
//! Nothing in this crate reaches for a process-wide generator on its own:
//! a default-constructed config gets a freshly seeded [`SeededRandom`],
//! and callers that want deterministic delays seed one themselves.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// A source of non-negative random integers below an exclusive bound.
///
/// Implementations must be safe to sample from several threads at once,
/// so one source may back many timers. Give each timer its own source
/// when independent sequences matter more than sharing.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Sample uniformly from `[0, bound)`.
    ///
    /// Returns 0 when `bound` is 0.
    fn below(&self, bound: u64) -> u64;
}

/// A `StdRng` behind a mutex.
///
/// Two sources built with the same seed produce the same samples, which
/// makes delay sequences reproducible in tests.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a source with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Create a source seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        // A panic while holding the lock cannot leave StdRng half-updated
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..bound)
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandom").finish_non_exhaustive()
    }
}

/// Samples from `rand::thread_rng`, one generator per thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..bound)
    }
}
