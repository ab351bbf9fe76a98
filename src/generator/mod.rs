mod atomic;
mod basic;
mod lock;
mod mutex;

pub use atomic::*;
pub use basic::*;
pub use lock::*;
pub(crate) use mutex::Mutex;

use crate::{ConfigError, Error, FirnId};

/// Checks a `(machine_id, site_id)` pair against the 5-bit field widths.
///
/// Runs once per constructor; a generator holding an out-of-range identity
/// is never built.
pub(crate) fn validate_identity(machine_id: u64, site_id: u64) -> Result<(), ConfigError> {
    if machine_id > FirnId::MAX_MACHINE_ID {
        return Err(ConfigError::MachineIdOutOfRange(machine_id));
    }
    if site_id > FirnId::MAX_SITE_ID {
        return Err(ConfigError::SiteIdOutOfRange(site_id));
    }
    Ok(())
}

#[cold]
#[inline(never)]
pub(crate) fn cold_clock_regression(now: u64, last_ts: u64) -> Error {
    debug_assert!(last_ts > now);
    let behind_ms = last_ts - now;
    #[cfg(feature = "tracing")]
    tracing::warn!(behind_ms, "clock moved backwards; rejecting id generation");
    Error::ClockRegression { behind_ms }
}
