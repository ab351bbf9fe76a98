use crate::FirnId;

/// Represents the result of a single, non-blocking id generation attempt.
///
/// This type models the outcome of `try_next_id()`:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the sequence space for the current
///   millisecond is exhausted and no ID can be produced until the clock
///   advances.
///
/// This allows non-blocking generation loops and clean backoff strategies;
/// the blocking `next_id()` methods are built on top of it.
///
/// # Example
///
/// ```
/// use firn::{BasicIdGenerator, FirnId, IdGenStatus, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let generator =
///     BasicIdGenerator::with_sequence(0, 0, FirnId::MAX_SEQUENCE, FixedTime)?;
/// match generator.try_next_id()? {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for: {yield_for} ms"),
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: FirnId,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current tick.
    ///
    /// Re-sample the clock after roughly `yield_for` milliseconds before
    /// attempting to generate again.
    Pending {
        /// A hint for how long to wait, in milliseconds.
        yield_for: u64,
    },
}
