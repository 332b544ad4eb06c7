use crate::SnowflakeId;

/// Outcome of a non-blocking generation attempt.
///
/// Returned by [`Snowflake::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] carries a freshly generated ID.
/// - [`IdGenStatus::Pending`] means the current millisecond's 4096 sequence
///   values are used up; retry after `yield_for` milliseconds.
///
/// [`Snowflake::try_poll_id`]: crate::Snowflake::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// No ID could be generated because the sequence has been exhausted for the
    /// current millisecond.
    Pending {
        /// Milliseconds to wait before the next bucket opens.
        yield_for: u64,
    },
}
