use core::time::Duration;

use crate::{Error, Result, SnowflakeId, TWITTER_EPOCH};

/// Default tolerance for backward clock jumps, in milliseconds.
pub const DEFAULT_TIME_OFFSET_TOLERANCE_MS: u64 = 2_000;

/// Largest accepted epoch, in Unix milliseconds. Every 41-bit timestamp
/// added to it still fits in an `i64`.
pub const MAX_EPOCH_MS: u64 = i64::MAX as u64 - SnowflakeId::max_timestamp();

/// Construction parameters for a [`Snowflake`] generator.
///
/// The ranged fields are signed so that values read from environment
/// variables, JSON or signed-integer peers are rejected by [`validate`]
/// instead of silently wrapping.
///
/// # Example
///
/// ```
/// use snowmint::SnowflakeConfig;
///
/// let config = SnowflakeConfig::new(3, 7)
///     .with_random_sequence_limit(128)
///     .with_time_offset_tolerance_ms(500);
/// assert!(config.validate().is_ok());
///
/// assert!(SnowflakeConfig::new(32, 0).validate().is_err());
/// ```
///
/// [`Snowflake`]: crate::Snowflake
/// [`validate`]: SnowflakeConfig::validate
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnowflakeConfig {
    /// Node identifier, `0..=31`.
    pub worker_id: i64,
    /// Partition / region identifier, `0..=31`.
    pub data_center_id: i64,
    /// Exclusive upper bound for the random starting sequence of a new
    /// millisecond, `0..=4095`. Values `0` and `1` disable randomization.
    ///
    /// Under light load every ID would otherwise end in sequence `0`, making
    /// them all even.
    pub random_sequence_limit: i64,
    /// Largest backward clock jump that is absorbed by reusing the last
    /// timestamp.
    pub time_offset_tolerance_ms: u64,
    /// Zero point subtracted from Unix milliseconds before encoding,
    /// `0..=`[`MAX_EPOCH_MS`].
    pub epoch_ms: u64,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            worker_id: 0,
            data_center_id: 0,
            random_sequence_limit: 0,
            time_offset_tolerance_ms: DEFAULT_TIME_OFFSET_TOLERANCE_MS,
            epoch_ms: TWITTER_EPOCH.as_millis() as u64,
        }
    }
}

impl SnowflakeConfig {
    /// Creates a configuration for the given node with defaults for
    /// everything else.
    pub fn new(worker_id: i64, data_center_id: i64) -> Self {
        Self {
            worker_id,
            data_center_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_worker_id(mut self, worker_id: i64) -> Self {
        self.worker_id = worker_id;
        self
    }

    #[must_use]
    pub fn with_data_center_id(mut self, data_center_id: i64) -> Self {
        self.data_center_id = data_center_id;
        self
    }

    #[must_use]
    pub fn with_random_sequence_limit(mut self, limit: i64) -> Self {
        self.random_sequence_limit = limit;
        self
    }

    #[must_use]
    pub fn with_time_offset_tolerance_ms(mut self, tolerance_ms: u64) -> Self {
        self.time_offset_tolerance_ms = tolerance_ms;
        self
    }

    #[must_use]
    pub fn with_epoch_ms(mut self, epoch_ms: u64) -> Self {
        self.epoch_ms = epoch_ms;
        self
    }

    /// Sets the epoch from a [`Duration`] since the Unix epoch, such as
    /// [`TWITTER_EPOCH`]. Durations too long for `u64` milliseconds saturate
    /// and then fail [`validate`](Self::validate).
    #[must_use]
    pub fn with_epoch(self, epoch: Duration) -> Self {
        self.with_epoch_ms(u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX))
    }

    /// Checks every ranged field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first field outside
    /// its range.
    pub fn validate(&self) -> Result<()> {
        check_between("worker_id", self.worker_id, SnowflakeId::max_worker_id())?;
        check_between(
            "data_center_id",
            self.data_center_id,
            SnowflakeId::max_data_center_id(),
        )?;
        check_between(
            "random_sequence_limit",
            self.random_sequence_limit,
            SnowflakeId::max_sequence(),
        )?;
        check_between(
            "epoch_ms",
            i64::try_from(self.epoch_ms).unwrap_or(i64::MAX),
            MAX_EPOCH_MS,
        )?;
        Ok(())
    }
}

fn check_between(field: &'static str, value: i64, max: u64) -> Result<()> {
    let max = max as i64;
    if (0..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration { field, value, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_twitter_layout() {
        let config = SnowflakeConfig::default();
        assert_eq!(config.epoch_ms, 1_288_834_974_657);
        assert_eq!(config.time_offset_tolerance_ms, 2_000);
        assert_eq!(config.random_sequence_limit, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn worker_id_range() {
        assert!(SnowflakeConfig::new(31, 0).validate().is_ok());
        assert_eq!(
            SnowflakeConfig::new(32, 0).validate(),
            Err(Error::InvalidConfiguration {
                field: "worker_id",
                value: 32,
                max: 31
            })
        );
        assert_eq!(
            SnowflakeConfig::new(-1, 0).validate(),
            Err(Error::InvalidConfiguration {
                field: "worker_id",
                value: -1,
                max: 31
            })
        );
    }

    #[test]
    fn data_center_id_range() {
        assert!(SnowflakeConfig::new(0, 31).validate().is_ok());
        assert!(matches!(
            SnowflakeConfig::new(0, 32).validate(),
            Err(Error::InvalidConfiguration {
                field: "data_center_id",
                ..
            })
        ));
        assert!(SnowflakeConfig::new(0, -5).validate().is_err());
    }

    #[test]
    fn random_sequence_limit_range() {
        let base = SnowflakeConfig::new(0, 0);
        assert!(base.clone().with_random_sequence_limit(4095).validate().is_ok());
        assert!(matches!(
            base.clone().with_random_sequence_limit(4096).validate(),
            Err(Error::InvalidConfiguration {
                field: "random_sequence_limit",
                max: 4095,
                ..
            })
        ));
        assert!(base.with_random_sequence_limit(-1).validate().is_err());
    }

    #[test]
    fn epoch_from_duration() {
        let config = SnowflakeConfig::default().with_epoch(Duration::from_secs(10));
        assert_eq!(config.epoch_ms, 10_000);
    }

    #[test]
    fn epoch_leaves_room_for_every_timestamp() {
        let base = SnowflakeConfig::new(0, 0);
        assert!(base.clone().with_epoch_ms(0).validate().is_ok());
        assert!(base.clone().with_epoch_ms(MAX_EPOCH_MS).validate().is_ok());
        assert_eq!(
            base.clone().with_epoch_ms(MAX_EPOCH_MS + 1).validate(),
            Err(Error::InvalidConfiguration {
                field: "epoch_ms",
                value: (MAX_EPOCH_MS + 1) as i64,
                max: MAX_EPOCH_MS as i64,
            })
        );
        assert!(matches!(
            base.with_epoch_ms(u64::MAX).validate(),
            Err(Error::InvalidConfiguration {
                field: "epoch_ms",
                value: i64::MAX,
                ..
            })
        ));
    }

    #[test]
    fn oversized_epoch_duration_saturates() {
        let config = SnowflakeConfig::default().with_epoch(Duration::MAX);
        assert_eq!(config.epoch_ms, u64::MAX);
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_defaults() {
        let config: SnowflakeConfig =
            serde_json::from_str(r#"{ "worker_id": 4, "data_center_id": 9 }"#).unwrap();
        assert_eq!(config, SnowflakeConfig::new(4, 9));
    }
}
