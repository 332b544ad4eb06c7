use core::{cmp::Ordering, hint};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, RandSource, Result, SnowflakeConfig, SnowflakeId, SystemClock, ThreadRandom,
    TimeSource,
    generator::{IdGenStatus, Mutex, lock},
};

/// Mutable generator state. Guarded by a single mutex.
#[derive(Debug, Default)]
struct State {
    /// Unix milliseconds of the last issued ID; `None` until the first one.
    last_timestamp: Option<u64>,
    sequence: u64,
}

/// A lock-based Snowflake ID generator for one (worker, data center) pair.
///
/// All state transitions happen while holding one mutex, so a single
/// instance can be shared across threads (e.g. behind an [`Arc`]) and never
/// hands out the same ID twice.
///
/// - Small backward clock jumps (up to `time_offset_tolerance_ms`) are
///   absorbed by reusing the last timestamp.
/// - Larger ones fail the call with [`Error::ClockMovedBackwards`].
/// - When all 4096 sequence values of a millisecond are used up,
///   [`next_id`](Self::next_id) spins until the clock advances, while
///   [`try_poll_id`](Self::try_poll_id) returns [`IdGenStatus::Pending`].
///
/// [`Arc`]: std::sync::Arc
///
/// # Example
///
/// ```
/// use snowmint::{Snowflake, SnowflakeConfig};
///
/// let generator = Snowflake::with_config(
///     SnowflakeConfig::new(1, 1).with_random_sequence_limit(16),
/// )?;
///
/// let a = generator.next_id()?;
/// let b = generator.next_id()?;
/// assert!(a < b);
/// # Ok::<(), snowmint::Error>(())
/// ```
#[derive(Debug)]
pub struct Snowflake<T = SystemClock, R = ThreadRandom> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    config: SnowflakeConfig,
    worker_id: u64,
    data_center_id: u64,
    random_sequence_limit: u64,
    time: T,
    rng: R,
}

/// All fields of an ID, with the timestamp converted back to Unix
/// milliseconds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedId {
    /// The ID that was decoded.
    pub id: SnowflakeId,
    /// Generation time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub data_center_id: u64,
    pub worker_id: u64,
    /// Position of the ID within its millisecond.
    pub sequence: u64,
}

impl Snowflake {
    /// Creates a generator on the system clock with default settings for
    /// everything but the node identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either ID is outside
    /// `0..=31`.
    pub fn new(worker_id: i64, data_center_id: i64) -> Result<Self> {
        Self::with_config(SnowflakeConfig::new(worker_id, data_center_id))
    }

    /// Creates a generator on the system clock and thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not validate.
    pub fn with_config(config: SnowflakeConfig) -> Result<Self> {
        Self::with_sources(config, SystemClock, ThreadRandom)
    }
}

impl<T, R> Snowflake<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    /// Creates a generator with explicit time and randomness sources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not validate.
    pub fn with_sources(config: SnowflakeConfig, time: T, rng: R) -> Result<Self> {
        config.validate()?;
        let state = Mutex::new(State::default());
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            // Ranges were checked by `validate`.
            worker_id: config.worker_id as u64,
            data_center_id: config.data_center_id as u64,
            random_sequence_limit: config.random_sequence_limit as u64,
            config,
            time,
            rng,
        })
    }

    /// Generates the next ID, spinning if the current millisecond is
    /// exhausted.
    ///
    /// The whole read-modify-write runs under the instance lock, including the
    /// spin, so concurrent callers queue behind it. The spin is bounded by
    /// clock progression (normally well under a millisecond) and cannot be
    /// cancelled; callers that need a deadline should wrap the call in their
    /// own timeout or use [`try_poll_id`](Self::try_poll_id).
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackwards`] if the clock is behind the last issued
    ///   timestamp by more than the tolerance, or falls behind it at all while
    ///   waiting for the next millisecond.
    /// - [`Error::TimestampOutOfRange`] if the clock cannot be encoded against
    ///   the configured epoch.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = lock(&self.state)?;

        let now = self.observe(self.time.current_millis(), state.last_timestamp)?;
        let (now, sequence) = match self.next_sequence(&state, now) {
            Some(sequence) => (now, sequence),
            None => (self.til_next_millis(now)?, 0),
        };

        let id = self.compose(now, sequence)?;
        state.last_timestamp = Some(now);
        state.sequence = sequence;
        Ok(id)
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Returns [`IdGenStatus::Pending`] instead of spinning when the current
    /// millisecond is exhausted; the state is left untouched in that case.
    /// `yield_for` covers the distance to the next millisecond, including any
    /// tolerated clock regression still being absorbed.
    ///
    /// # Errors
    ///
    /// Same as [`next_id`](Self::next_id), except that no error can arise
    /// from waiting.
    ///
    /// # Example
    ///
    /// ```
    /// use snowmint::{IdGenStatus, Snowflake};
    ///
    /// let generator = Snowflake::new(0, 0)?;
    /// let id = loop {
    ///     match generator.try_poll_id()? {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.worker_id(), 0);
    /// # Ok::<(), snowmint::Error>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut state = lock(&self.state)?;

        let clock = self.time.current_millis();
        let now = self.observe(clock, state.last_timestamp)?;
        let Some(sequence) = self.next_sequence(&state, now) else {
            // A pinned timestamp stays exhausted until the clock passes it.
            return Ok(IdGenStatus::Pending {
                yield_for: now.saturating_sub(clock) + 1,
            });
        };

        let id = self.compose(now, sequence)?;
        state.last_timestamp = Some(now);
        state.sequence = sequence;
        Ok(IdGenStatus::Ready { id })
    }

    /// Pins a clock reading that regressed within tolerance to `last`.
    #[inline]
    fn observe(&self, now: u64, last: Option<u64>) -> Result<u64> {
        match last {
            Some(last) if now < last => self.cold_clock_behind(now, last),
            _ => Ok(now),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, now: u64, last: u64) -> Result<u64> {
        let behind_ms = last - now;
        if behind_ms <= self.config.time_offset_tolerance_ms {
            #[cfg(feature = "tracing")]
            tracing::warn!(behind_ms, "clock moved backwards, reusing last timestamp");
            Ok(last)
        } else {
            #[cfg(feature = "tracing")]
            tracing::error!(behind_ms, "clock moved backwards beyond tolerance");
            Err(Error::ClockMovedBackwards { behind_ms })
        }
    }

    /// Sequence to use at `now`, or `None` if the bucket is exhausted.
    #[inline]
    fn next_sequence(&self, state: &State, now: u64) -> Option<u64> {
        match state.last_timestamp {
            Some(last) if now == last => {
                let next = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
                (next != 0).then_some(next)
            }
            _ => Some(self.start_sequence()),
        }
    }

    fn start_sequence(&self) -> u64 {
        if self.random_sequence_limit > 1 {
            self.rng.rand_below(self.random_sequence_limit)
        } else {
            0
        }
    }

    /// Polls the clock until it moves past `last`.
    fn til_next_millis(&self, last: u64) -> Result<u64> {
        #[cfg(feature = "tracing")]
        tracing::trace!(last, "sequence exhausted, waiting for next millisecond");
        loop {
            let now = self.time.current_millis();
            match now.cmp(&last) {
                Ordering::Greater => return Ok(now),
                Ordering::Equal => hint::spin_loop(),
                Ordering::Less => {
                    return Err(Error::ClockMovedBackwards {
                        behind_ms: last - now,
                    });
                }
            }
        }
    }

    fn compose(&self, now: u64, sequence: u64) -> Result<SnowflakeId> {
        let timestamp = now
            .checked_sub(self.config.epoch_ms)
            .filter(|ts| *ts <= SnowflakeId::max_timestamp())
            .ok_or(Error::TimestampOutOfRange { millis: now })?;
        Ok(SnowflakeId::from_components(
            timestamp,
            self.data_center_id,
            self.worker_id,
            sequence,
        ))
    }
}

impl<T, R> Snowflake<T, R> {
    /// Absolute Unix milliseconds at which `id` was generated, assuming it
    /// came from a generator with the same epoch.
    ///
    /// Cannot overflow: [`SnowflakeConfig::validate`] bounds the epoch so
    /// that every 41-bit timestamp fits on top of it.
    pub fn decode_timestamp(&self, id: impl Into<SnowflakeId>) -> u64 {
        id.into().timestamp() + self.config.epoch_ms
    }

    /// Worker ID encoded in `id`.
    pub fn decode_worker_id(&self, id: impl Into<SnowflakeId>) -> u64 {
        id.into().worker_id()
    }

    /// Data-center ID encoded in `id`.
    pub fn decode_data_center_id(&self, id: impl Into<SnowflakeId>) -> u64 {
        id.into().data_center_id()
    }

    /// Every field of `id` at once.
    pub fn decode(&self, id: impl Into<SnowflakeId>) -> DecodedId {
        let id = id.into();
        DecodedId {
            id,
            timestamp_ms: self.decode_timestamp(id),
            data_center_id: id.data_center_id(),
            worker_id: id.worker_id(),
            sequence: id.sequence(),
        }
    }

    /// Worker ID stamped into every ID from this generator.
    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Data-center ID stamped into every ID from this generator.
    pub fn data_center_id(&self) -> u64 {
        self.data_center_id
    }

    /// Epoch in Unix milliseconds that timestamps are measured from.
    pub fn epoch_ms(&self) -> u64 {
        self.config.epoch_ms
    }

    /// The validated configuration this generator was built from.
    pub fn config(&self) -> &SnowflakeConfig {
        &self.config
    }
}
