use core::cell::Cell;
use core::cmp::Ordering;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConfigError, FirnId, IdGenStatus, Result, TimeSource,
    generator::{cold_clock_regression, validate_identity},
};

/// A single-threaded ID generator.
///
/// This generator keeps its state in a [`Cell`] and performs no
/// synchronization, making it the cheapest flavor when ids are only ever
/// requested from one thread (or one generator is owned per thread).
///
/// ## Recommended When
/// - You're in a single-threaded environment
/// - You want zero locking overhead
///
/// ## See Also
/// - [`LockIdGenerator`]
/// - [`AtomicIdGenerator`]
///
/// [`LockIdGenerator`]: crate::LockIdGenerator
/// [`AtomicIdGenerator`]: crate::AtomicIdGenerator
pub struct BasicIdGenerator<T: TimeSource> {
    state: Cell<FirnId>,
    time: T,
}

impl<T: TimeSource> BasicIdGenerator<T> {
    /// Creates a new [`BasicIdGenerator`] for the given identity.
    ///
    /// # Parameters
    /// - `machine_id`: worker identity, `0..=31`. Encoded into every
    ///   generated id.
    /// - `site_id`: data-center identity, `0..=31`. Encoded into every
    ///   generated id.
    /// - `time`: a [`TimeSource`] returning epoch-relative milliseconds.
    ///
    /// # Errors
    /// Returns [`ConfigError::MachineIdOutOfRange`] or
    /// [`ConfigError::SiteIdOutOfRange`] if either identity exceeds its
    /// 5-bit field.
    ///
    /// # Example
    /// ```
    /// use firn::{BasicIdGenerator, MonotonicClock};
    ///
    /// let generator = BasicIdGenerator::new(1, 1, MonotonicClock::default())?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.machine_id(), 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(machine_id: u64, site_id: u64, time: T) -> Result<Self, ConfigError> {
        Self::with_sequence(machine_id, site_id, 0, time)
    }

    /// Creates a generator with a caller-supplied starting sequence.
    ///
    /// The sequence is masked to 12 bits rather than range-checked; the
    /// first id issued on a fresh millisecond resets it to zero regardless,
    /// so the starting value only matters if generation begins within the
    /// construction millisecond.
    ///
    /// # Errors
    /// Same identity validation as [`Self::new`].
    pub fn with_sequence(
        machine_id: u64,
        site_id: u64,
        sequence: u64,
        time: T,
    ) -> Result<Self, ConfigError> {
        Self::from_components(0, machine_id, site_id, sequence, time)
    }

    /// Creates a generator from explicit component values.
    ///
    /// Primarily useful for restoring a known position (e.g. in tests that
    /// pin the state to a specific tick). `timestamp` and `sequence` are
    /// masked to their field widths; the identity fields are validated.
    ///
    /// # Errors
    /// Same identity validation as [`Self::new`].
    pub fn from_components(
        timestamp: u64,
        machine_id: u64,
        site_id: u64,
        sequence: u64,
        time: T,
    ) -> Result<Self, ConfigError> {
        validate_identity(machine_id, site_id)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(machine_id, site_id, "id generator starting");
        let id = FirnId::from_parts(timestamp, site_id, machine_id, sequence);
        Ok(Self {
            state: Cell::new(id),
            time,
        })
    }

    /// Generates the next available ID, blocking while the current
    /// millisecond's sequence space is exhausted.
    ///
    /// The wait is a busy spin that re-samples the clock each pass and is
    /// bounded only by wall-clock progression (typically a single
    /// millisecond); there is no timeout or cancellation path. Callers that
    /// need a bound should use [`Self::try_next_id`] with their own backoff.
    ///
    /// # Errors
    /// Returns [`Error::ClockRegression`] if the clock reads earlier than
    /// the timestamp of the last issued id. Generator state is left
    /// untouched so the caller may retry once the clock catches up.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    pub fn next_id(&self) -> Result<FirnId> {
        loop {
            match self.try_next_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { .. } => core::hint::spin_loop(),
            }
        }
    }

    /// Attempts to generate the next available ID without blocking.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: the sequence space for
    ///   this millisecond is exhausted; retry after the clock advances
    /// - `Err(e)`: the clock moved backwards
    ///
    /// # Example
    /// ```
    /// use firn::{BasicIdGenerator, IdGenStatus, MonotonicClock};
    ///
    /// let generator = BasicIdGenerator::new(0, 0, MonotonicClock::default())?;
    ///
    /// let id = loop {
    ///     match generator.try_next_id()? {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.site_id(), 0);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<IdGenStatus> {
        let now = self.time.current_millis();
        let state = self.state.get();
        let last_ts = state.timestamp();

        match now.cmp(&last_ts) {
            Ordering::Equal => {
                if state.has_sequence_room() {
                    let updated = state.increment_sequence();
                    self.state.set(updated);
                    Ok(IdGenStatus::Ready { id: updated })
                } else {
                    Ok(IdGenStatus::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                let updated = state.rollover_to_timestamp(now);
                self.state.set(updated);
                Ok(IdGenStatus::Ready { id: updated })
            }
            Ordering::Less => Err(cold_clock_regression(now, last_ts)),
        }
    }
}
