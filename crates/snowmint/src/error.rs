/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `snowmint` can produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A construction parameter fell outside its valid range.
    ///
    /// Nothing can be generated from such a configuration; rebuild the
    /// generator with valid values.
    #[error("invalid configuration: {field} = {value}, expected a value in 0..={max}")]
    InvalidConfiguration {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value, saturated to `i64::MAX` for larger unsigned
        /// inputs.
        value: i64,
        /// Largest accepted value (inclusive).
        max: i64,
    },

    /// The clock moved backward further than the configured tolerance.
    ///
    /// Only the failing call is affected. The generator state is untouched and
    /// later calls succeed once the clock has caught up again.
    #[error("clock moved backwards, refusing to generate id for {behind_ms}ms")]
    ClockMovedBackwards {
        /// How far behind the last issued timestamp the clock was observed.
        behind_ms: u64,
    },

    /// The current time cannot be encoded in the 41-bit timestamp field:
    /// either it precedes the epoch or it is too far past it.
    #[error("timestamp {millis}ms is outside the encodable range for the configured epoch")]
    TimestampOutOfRange {
        /// The clock reading, in milliseconds since the Unix epoch.
        millis: u64,
    },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
