//! Retry loop errors

use std::error::Error;

/// Why a retry loop gave up.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E>
where
    E: Error + 'static,
{
    /// The retry predicate rejected the error.
    #[error("non-retryable error: {0}")]
    NotRetryable(#[source] E),

    /// The retry limit was reached.
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted {
        /// Total attempts made, including the first.
        attempts: u32,
        /// The error from the final attempt.
        source: E,
    },
}

impl<E> RetryError<E>
where
    E: Error + 'static,
{
    /// The error from the last attempt.
    pub fn into_inner(self) -> E {
        match self {
            Self::NotRetryable(err) => err,
            Self::Exhausted { source, .. } => source,
        }
    }

    /// Borrow the error from the last attempt.
    pub fn inner(&self) -> &E {
        match self {
            Self::NotRetryable(err) => err,
            Self::Exhausted { source, .. } => source,
        }
    }

    /// `true` when the retry limit ended the loop.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
