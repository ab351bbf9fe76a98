/// A result type defaulting to the crate's call-time [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Construction-time validation failures.
///
/// Surfaced by the generator constructors before any state is allocated; a
/// generator is never built with an out-of-range identity. Retrying with the
/// same inputs cannot succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The machine ID does not fit the 5-bit field.
    #[error("machine id {0} out of range (0..=31)")]
    MachineIdOutOfRange(u64),

    /// The site ID does not fit the 5-bit field.
    #[error("site id {0} out of range (0..=31)")]
    SiteIdOutOfRange(u64),
}

/// All call-time errors an ID generator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The sampled clock is behind the timestamp of the last issued id.
    ///
    /// Issuing ids while the clock is behind risks colliding with ids
    /// already handed out, so the call fails instead of waiting. The caller
    /// decides whether to pause and retry, alert, or fail the enclosing
    /// request; `behind_ms` is how far backward the clock appears to have
    /// moved.
    #[error("clock moved backwards; refusing to generate an id for {behind_ms} ms")]
    ClockRegression {
        /// Milliseconds between the last issued timestamp and the sampled
        /// clock.
        behind_ms: u64,
    },

    /// The operation failed due to a poisoned lock.
    ///
    /// This can happen if another thread panicked while holding the
    /// generator's shared lock. Not produced when the `parking-lot` feature
    /// is enabled.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};

// Convert all poisoned lock errors to a simplified `LockPoisoned`
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages_name_the_offending_value() {
        assert_eq!(
            ConfigError::MachineIdOutOfRange(32).to_string(),
            "machine id 32 out of range (0..=31)"
        );
        assert_eq!(
            ConfigError::SiteIdOutOfRange(99).to_string(),
            "site id 99 out of range (0..=31)"
        );
    }

    #[test]
    fn clock_regression_reports_the_delta() {
        let err = Error::ClockRegression { behind_ms: 7 };
        assert_eq!(
            err.to_string(),
            "clock moved backwards; refusing to generate an id for 7 ms"
        );
    }
}
