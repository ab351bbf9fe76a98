//! Distributed Snowflake-style 64-bit ID generation.
//!
//! `firn` produces unique, strictly increasing 64-bit identifiers across a
//! fleet of independently running generator instances without a coordination
//! service. Each [`FirnId`] packs four fields, most significant first:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21       17 16          12 11             0
//!              +--------------+----------------+-----------+--------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | site (5)  | machine (5)  | sequence (12) |
//!              +--------------+----------------+-----------+--------------+---------------+
//!              |<------------ MSB ----------- 64 bits ------------ LSB ----------------->|
//! ```
//!
//! Timestamps are milliseconds since a fixed deployment epoch
//! ([`DEFAULT_EPOCH`], 2015-01-01 UTC), giving roughly 69 years of usable
//! range. Uniqueness holds as long as the deployment never runs two live
//! instances with the same `(site_id, machine_id)` pair.
//!
//! Three generator flavors share the same contract:
//!
//! - [`BasicIdGenerator`]: single-threaded, no synchronization.
//! - [`LockIdGenerator`]: mutex-guarded, fair under contention.
//! - [`AtomicIdGenerator`]: lock-free compare-and-swap commit.
//!
//! A backward-moving clock is detected and surfaced as
//! [`Error::ClockRegression`] carrying the observed delta; it is never
//! silently retried, because issuing ids while the clock is behind risks
//! colliding with ids already handed out.
//!
//! # Example
//!
//! ```
//! use firn::{LockIdGenerator, MonotonicClock};
//!
//! let generator = LockIdGenerator::new(1, 1, MonotonicClock::default())?;
//!
//! let id = generator.next_id()?;
//! assert_eq!(id.machine_id(), 1);
//! assert_eq!(id.site_id(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod error;
mod generator;
mod id;
mod status;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::status::*;
pub use crate::time::*;
