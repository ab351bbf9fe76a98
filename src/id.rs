use core::fmt;

/// A 64-bit Snowflake-style identifier.
///
/// - 1 bit reserved (always 0)
/// - 41 bits timestamp (ms since the configured epoch, e.g.
///   [`DEFAULT_EPOCH`])
/// - 5 bits site ID (data-center identity)
/// - 5 bits machine ID (worker identity)
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21      17 16          12 11             0
///              +--------------+----------------+----------+--------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | site (5) | machine (5)  | sequence (12) |
///              +--------------+----------------+----------+--------------+---------------+
///              |<----------- MSB ----------- 64 bits ----------- LSB ------------------>|
/// ```
///
/// For a fixed `(site_id, machine_id)` pair, ids compare in issue order: the
/// timestamp occupies the high bits and the sequence the low bits, so the
/// derived `Ord` over the raw integer is exactly generation order.
///
/// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirnId {
    id: u64,
}

impl FirnId {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 5-bit site ID field. Occupies bits 17
    /// through 21.
    pub const SITE_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 5-bit machine ID field. Occupies bits 12
    /// through 16.
    pub const MACHINE_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the site ID to its correct position (bit 17).
    pub const SITE_ID_SHIFT: u64 = 17;

    /// Number of bits to shift the machine ID to its correct position (bit
    /// 12).
    pub const MACHINE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Largest encodable timestamp, in milliseconds since the epoch.
    pub const MAX_TIMESTAMP: u64 = Self::TIMESTAMP_MASK;

    /// Largest valid site ID (31).
    pub const MAX_SITE_ID: u64 = Self::SITE_ID_MASK;

    /// Largest valid machine ID (31).
    pub const MAX_MACHINE_ID: u64 = Self::MACHINE_ID_MASK;

    /// Largest sequence value within a single millisecond (4095).
    pub const MAX_SEQUENCE: u64 = Self::SEQUENCE_MASK;

    /// Packs the four fields into an id, masking each to its width.
    ///
    /// The reserved sign bit is left clear by construction: the widest field
    /// ends at bit 62.
    pub const fn from_parts(timestamp: u64, site_id: u64, machine_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let site_id = (site_id & Self::SITE_ID_MASK) << Self::SITE_ID_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | site_id | machine_id | sequence,
        }
    }

    /// Packs the four fields into an id, asserting each fits its width in
    /// debug builds.
    pub fn from_components(timestamp: u64, site_id: u64, machine_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(site_id <= Self::SITE_ID_MASK, "site_id overflow");
        debug_assert!(machine_id <= Self::MACHINE_ID_MASK, "machine_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from_parts(timestamp, site_id, machine_id, sequence)
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the site ID from the packed ID.
    pub const fn site_id(&self) -> u64 {
        (self.id >> Self::SITE_ID_SHIFT) & Self::SITE_ID_MASK
    }

    /// Extracts the machine ID from the packed ID.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Converts this ID into its raw `u64` representation.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Converts a raw `u64` into an ID.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns true if the current sequence value can be incremented without
    /// wrapping.
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::MAX_SEQUENCE
    }

    /// Returns a new ID with the sequence incremented, same tick.
    pub(crate) fn increment_sequence(&self) -> Self {
        Self::from_components(
            self.timestamp(),
            self.site_id(),
            self.machine_id(),
            self.sequence() + 1,
        )
    }

    /// Returns a new ID for a newer timestamp with the sequence reset to
    /// zero.
    pub(crate) fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.site_id(), self.machine_id(), 0)
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<FirnId> for u64 {
    fn from(id: FirnId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for FirnId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for FirnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for FirnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirnId")
            .field("timestamp", &self.timestamp())
            .field("site_id", &self.site_id())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
