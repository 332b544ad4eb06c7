use core::fmt;

/// A 64-bit Snowflake ID.
///
/// - 1 bit reserved (always zero, so the value is also a positive `i64`)
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 5 bits data-center ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21           17 16         12 11             0
///              +--------------+----------------+---------------+-------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | data ctr (5)  | worker (5)  | sequence (12) |
///              +--------------+----------------+---------------+-------------+---------------+
///              |<------------------ MSB ---------------- 64 bits -------------- LSB -------->|
/// ```
///
/// The timestamp stored here is relative to the epoch of the generator that
/// produced the ID. Use [`Snowflake::decode_timestamp`] to recover absolute
/// Unix milliseconds.
///
/// # Example
///
/// ```
/// use snowmint::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 3, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.data_center_id(), 3);
/// assert_eq!(id.worker_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// ```
///
/// [`Snowflake::decode_timestamp`]: crate::Snowflake::decode_timestamp
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for the 5-bit data-center field. Occupies bits 17 through 21.
    pub const DATA_CENTER_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for the 5-bit worker field. Occupies bits 12 through 16.
    pub const WORKER_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the data-center ID to its position (bit 17).
    pub const DATA_CENTER_ID_SHIFT: u64 = 17;

    /// Number of bits to shift the worker ID to its position (bit 12).
    pub const WORKER_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Packs the given components into an ID. Each component is masked to its
    /// field width.
    pub const fn from_components(
        timestamp: u64,
        data_center_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let data_center_id =
            (data_center_id & Self::DATA_CENTER_ID_MASK) << Self::DATA_CENTER_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | data_center_id | worker_id | sequence,
        }
    }

    /// Extracts the epoch-relative timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the data-center ID from the packed ID.
    pub const fn data_center_id(&self) -> u64 {
        (self.id >> Self::DATA_CENTER_ID_SHIFT) & Self::DATA_CENTER_ID_MASK
    }

    /// Extracts the worker ID from the packed ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    pub const fn max_data_center_id() -> u64 {
        Self::DATA_CENTER_ID_MASK
    }

    pub const fn max_worker_id() -> u64 {
        Self::WORKER_ID_MASK
    }

    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns the raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a raw packed value.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the packed value as a signed integer, for peers that store IDs
    /// in signed 64-bit columns. The reserved top bit keeps generated IDs
    /// non-negative.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<i64> for SnowflakeId {
    fn from(raw: i64) -> Self {
        Self::from_raw(raw as u64)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_i64()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("data_center_id", &self.data_center_id())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
