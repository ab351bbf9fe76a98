use core::cmp::Ordering;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConfigError, FirnId, IdGenStatus, Result, TimeSource,
    generator::{Mutex, cold_clock_regression, validate_identity},
};

/// A lock-based ID generator suitable for multi-threaded environments.
///
/// This generator wraps the packed `(timestamp, sequence)` state in an
/// [`Arc<Mutex<_>>`], allowing safe shared use across threads: every call
/// observes a consistent state pair and no two calls can receive the same
/// packed output.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
///
/// ## See Also
/// - [`BasicIdGenerator`]
/// - [`AtomicIdGenerator`]
///
/// [`BasicIdGenerator`]: crate::BasicIdGenerator
/// [`AtomicIdGenerator`]: crate::AtomicIdGenerator
pub struct LockIdGenerator<T: TimeSource> {
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<FirnId>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<FirnId>>,
    time: T,
}

impl<T: TimeSource> LockIdGenerator<T> {
    /// Creates a new [`LockIdGenerator`] for the given identity.
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
    /// use firn::{LockIdGenerator, MonotonicClock};
    ///
    /// let generator = LockIdGenerator::new(0, 3, MonotonicClock::default())?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.site_id(), 3);
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
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(id))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(id)),
            time,
        })
    }

    /// Generates the next available ID, blocking while the current
    /// millisecond's sequence space is exhausted.
    ///
    /// The wait is a busy spin bounded only by wall-clock progression
    /// (typically a single millisecond); there is no timeout or cancellation
    /// path. The lock is released and re-acquired between spins, so a
    /// waiting caller cannot starve other threads: each pass re-samples the
    /// clock and commits atomically under the lock.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock reads earlier than the
    ///   timestamp of the last issued id. State is left untouched.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding
    ///   the lock (std mutex only).
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
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
    /// - `Err(e)`: the clock moved backwards, or the lock was poisoned
    ///
    /// # Example
    /// ```
    /// use firn::{IdGenStatus, LockIdGenerator, MonotonicClock};
    ///
    /// let generator = LockIdGenerator::new(0, 0, MonotonicClock::default())?;
    ///
    /// let id = loop {
    ///     match generator.try_next_id()? {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { yield_for } => {
    ///             std::thread::sleep(core::time::Duration::from_millis(yield_for));
    ///         }
    ///     }
    /// };
    /// assert_eq!(id.machine_id(), 0);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<IdGenStatus> {
        let mut id = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Sampled under the lock: a peer cannot commit a newer tick between
        // this read and the state update below, so `now < last_ts` can only
        // mean the clock itself moved backwards.
        let now = self.time.current_millis();
        let last_ts = id.timestamp();
        match now.cmp(&last_ts) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    *id = id.increment_sequence();
                    Ok(IdGenStatus::Ready { id: *id })
                } else {
                    Ok(IdGenStatus::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                *id = id.rollover_to_timestamp(now);
                Ok(IdGenStatus::Ready { id: *id })
            }
            Ordering::Less => Err(cold_clock_regression(now, last_ts)),
        }
    }
}
