//! Construction errors for backoff configuration.

/// Result type for building backoff configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A backoff configuration that would produce degenerate delays.
///
/// Rejected at construction so a misconfigured client fails fast instead
/// of retrying in a tight loop with zero waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The unit base delay was zero.
    #[error("base delay must be greater than zero")]
    ZeroBase,

    /// The maximum delay was zero.
    #[error("maximum delay must be greater than zero")]
    ZeroMaxDuration,

    /// The growth base was zero.
    #[error("growth base must be at least 1")]
    ZeroGrowthBase,
}
