use core::cmp::Ordering as CmpOrdering;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConfigError, FirnId, IdGenStatus, Result, TimeSource,
    generator::{cold_clock_regression, validate_identity},
};

/// A lock-free ID generator suitable for multi-threaded environments.
///
/// This generator stores the entire packed state in an [`AtomicU64`] and
/// commits each `(timestamp, sequence)` transition with a compare-exchange:
/// the time check and the computed successor are speculative, and only the
/// winning CAS publishes a state, so concurrent callers can never observe
/// the same packed output. A lost race surfaces as
/// [`IdGenStatus::Pending`] with a zero wait, i.e. retry immediately.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`BasicIdGenerator`]
/// - [`LockIdGenerator`]
///
/// [`BasicIdGenerator`]: crate::BasicIdGenerator
/// [`LockIdGenerator`]: crate::LockIdGenerator
pub struct AtomicIdGenerator<T: TimeSource> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    time: T,
}

impl<T: TimeSource> AtomicIdGenerator<T> {
    /// Creates a new [`AtomicIdGenerator`] for the given identity.
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
    /// use firn::{AtomicIdGenerator, MonotonicClock};
    ///
    /// let generator = AtomicIdGenerator::new(2, 0, MonotonicClock::default())?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.machine_id(), 2);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(machine_id: u64, site_id: u64, time: T) -> Result<Self, ConfigError> {
        Self::with_sequence(machine_id, site_id, 0, time)
    }

    /// Creates a generator with a caller-supplied starting sequence.
    ///
    /// The sequence is masked to 12 bits rather than range-checked; the
    /// first id issued on a fresh millisecond resets it to zero regardless.
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
    /// `timestamp` and `sequence` are masked to their field widths; the
    /// identity fields are validated.
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
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(id.to_raw())),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(id.to_raw()),
            time,
        })
    }

    /// Generates the next available ID, blocking while the current
    /// millisecond's sequence space is exhausted.
    ///
    /// The wait is a busy spin bounded only by wall-clock progression
    /// (typically a single millisecond); there is no timeout or cancellation
    /// path. Lost CAS races also spin, retrying immediately.
    ///
    /// # Errors
    /// Returns [`Error::ClockRegression`] if the clock reads earlier than
    /// the timestamp of the last issued id. State is left untouched.
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
    /// - `Ok(IdGenStatus::Pending { yield_for: 0 })`: another thread won the
    ///   CAS race or committed a newer tick between this caller's clock
    ///   sample and its state read; retry immediately
    /// - `Ok(IdGenStatus::Pending { yield_for: 1 })`: the sequence space for
    ///   this millisecond is exhausted; retry after the clock advances
    /// - `Err(e)`: the clock moved backwards, confirmed by a sample taken
    ///   after observing the state
    ///
    /// # Example
    /// ```
    /// use firn::{AtomicIdGenerator, IdGenStatus, MonotonicClock};
    ///
    /// let generator = AtomicIdGenerator::new(0, 0, MonotonicClock::default())?;
    ///
    /// let id = loop {
    ///     match generator.try_next_id()? {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => core::hint::spin_loop(),
    ///     }
    /// };
    /// assert_eq!(id.sequence(), 0);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<IdGenStatus> {
        let now = self.time.current_millis();

        let current_raw = self.state.load(Ordering::Relaxed);
        let current = FirnId::from_raw(current_raw);
        let last_ts = current.timestamp();

        let next = match now.cmp(&last_ts) {
            CmpOrdering::Equal => {
                if current.has_sequence_room() {
                    current.increment_sequence()
                } else {
                    return Ok(IdGenStatus::Pending { yield_for: 1 });
                }
            }
            CmpOrdering::Greater => current.rollover_to_timestamp(now),
            CmpOrdering::Less => {
                // `now` was sampled before the load, so a peer may have
                // committed a newer tick in between. Only a sample taken
                // after observing the state can prove the clock itself moved
                // backwards; if the fresh sample has caught up, this was a
                // stale read and the caller should retry.
                let fresh = self.time.current_millis();
                if fresh >= last_ts {
                    return Ok(IdGenStatus::Pending { yield_for: 0 });
                }
                return Err(cold_clock_regression(fresh, last_ts));
            }
        };

        if self
            .state
            .compare_exchange(current_raw, next.to_raw(), Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            Ok(IdGenStatus::Ready { id: next })
        } else {
            // CAS failed - another thread won the race. Yield 0 to retry
            // immediately.
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}
