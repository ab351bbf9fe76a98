use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Default epoch: Thursday, January 1, 2015 00:00:00 UTC.
///
/// All timestamps embedded in a [`FirnId`] are measured from this instant,
/// which gives the 41-bit timestamp field roughly 69 years of range. The
/// epoch is a deployment constant: changing it retroactively breaks the
/// ordering guarantees of previously issued ids.
///
/// [`FirnId`]: crate::FirnId
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of the current time in milliseconds since a configured epoch.
///
/// This abstraction allows plugging in the real system clock, a monotonic
/// timer, or a mocked time source in tests. Implementations return the epoch
/// offset already subtracted, so generators pack the returned value directly
/// into the timestamp field.
///
/// # Example
///
/// ```
/// use firn::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// A wall-clock time source backed by [`SystemTime`].
///
/// Each call samples the system clock, so external adjustments (NTP steps,
/// manual changes) are visible to the caller. A backward step can make
/// [`current_millis`] return a smaller value than a previous call, which is
/// exactly the condition generators detect and report as a clock regression.
///
/// [`current_millis`]: TimeSource::current_millis
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    epoch: Duration,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource for WallClock {
    /// Returns milliseconds since the configured epoch, sampled from the
    /// system clock. Saturates to zero if the system clock reads earlier
    /// than the epoch.
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .saturating_sub(self.epoch)
            .as_millis() as u64
    }
}

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic time source that returns elapsed time since process start,
/// offset from a user-defined epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP or daylight savings changes)
/// while still aligning timestamps to a fixed origin, so a generator driven
/// by this clock can never observe a regression.
///
/// Internally, the clock captures `Instant::now()` at construction and spawns
/// a background thread that advances a shared atomic counter once per
/// millisecond. The thread exits when the last clone of the clock is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`DEFAULT_EPOCH`].
    ///
    /// Panics if system time is earlier than the default epoch.
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using a custom epoch as the origin
    /// (t = 0), specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// On each call to [`current_millis`], the clock returns the current tick
    /// value plus a fixed offset: the difference between the wall-clock time
    /// at construction and the given epoch. This avoids syscalls on the hot
    /// path and guarantees the returned value never goes backward, even if
    /// the system clock is adjusted externally.
    ///
    /// # Panics
    ///
    /// Panics if the current system time is earlier than the given epoch.
    ///
    /// [`current_millis`]: TimeSource::current_millis
    pub fn with_epoch(epoch: Duration) -> Self {
        let start = Instant::now();
        let system_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System clock before UNIX_EPOCH");
        let offset = system_now
            .checked_sub(epoch)
            .expect("System clock before custom epoch")
            .as_millis() as u64;

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute deadline for this tick.
                let target = start + Duration::from_millis(tick);

                // Sleep off the remainder if the deadline is still ahead.
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                // Sleep can overshoot, so re-measure against `start` rather
                // than trusting the deadline.
                let now_ms = start.elapsed().as_millis() as u64;

                // The published value only ever increases: it tracks elapsed
                // monotonic milliseconds.
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Schedule the following tick past the time actually reached.
                tick = now_ms + 1;
            }
        });

        inner
            ._handle
            .set(handle)
            .expect("failed to set thread handle");

        Self {
            inner,
            epoch_offset: offset,
        }
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based
    /// on the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.inner.current.load(Ordering::Relaxed)
    }
}
