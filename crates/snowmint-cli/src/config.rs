use anyhow::Context;
use clap::{Parser, Subcommand};
use snowmint::{DEFAULT_TIME_OFFSET_TOLERANCE_MS, SnowflakeConfig, TWITTER_EPOCH};

/// Command-line configuration for the `snowmint` binary.
///
/// Generator settings are read from CLI arguments, then environment variables
/// (a `.env` file in the working directory is loaded first), then defaults.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowmint",
    version,
    about = "Generate and decode Snowflake IDs"
)]
pub struct CliArgs {
    /// Worker (node) identifier encoded into every ID, `0..=31`.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Data-center identifier encoded into every ID, `0..=31`.
    ///
    /// Environment variable: `DATA_CENTER_ID`
    #[arg(long, env = "DATA_CENTER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub data_center_id: i64,

    /// Exclusive bound for the random starting sequence of each millisecond,
    /// `0..=4095`. `0` disables randomization.
    ///
    /// Environment variable: `RANDOM_SEQUENCE_LIMIT`
    #[arg(long, env = "RANDOM_SEQUENCE_LIMIT", default_value_t = 0, allow_negative_numbers = true)]
    pub random_sequence_limit: i64,

    /// Largest backward clock jump, in milliseconds, absorbed by reusing the
    /// last timestamp.
    ///
    /// Environment variable: `TIME_OFFSET_TOLERANCE_MS`
    #[arg(long, env = "TIME_OFFSET_TOLERANCE_MS", default_value_t = DEFAULT_TIME_OFFSET_TOLERANCE_MS)]
    pub time_offset_tolerance_ms: u64,

    /// Epoch in Unix milliseconds. Must match the epoch of whoever decodes the
    /// IDs.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = TWITTER_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print new IDs, one per line.
    Generate {
        /// How many IDs to generate.
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Print the fields of existing IDs as JSON, one object per line.
    Decode {
        /// IDs to decode.
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

impl TryFrom<&CliArgs> for SnowflakeConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self, Self::Error> {
        let config = SnowflakeConfig::new(args.worker_id, args.data_center_id)
            .with_random_sequence_limit(args.random_sequence_limit)
            .with_time_offset_tolerance_ms(args.time_offset_tolerance_ms)
            .with_epoch_ms(args.epoch_ms);
        config
            .validate()
            .context("invalid generator configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let args = CliArgs::try_parse_from(["snowmint", "generate"]).unwrap();
        assert_eq!(args.command, Command::Generate { count: 1 });

        let config = SnowflakeConfig::try_from(&args).unwrap();
        assert_eq!(config.epoch_ms, 1_288_834_974_657);
        assert_eq!(config.time_offset_tolerance_ms, 2_000);
    }

    #[test]
    fn flags_are_carried_into_config() {
        let args = CliArgs::try_parse_from([
            "snowmint",
            "--worker-id",
            "7",
            "--data-center-id",
            "3",
            "--random-sequence-limit",
            "64",
            "--epoch-ms",
            "0",
            "generate",
            "--count",
            "10",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Generate { count: 10 });

        let config = SnowflakeConfig::try_from(&args).unwrap();
        assert_eq!(
            config,
            SnowflakeConfig::new(7, 3)
                .with_random_sequence_limit(64)
                .with_epoch_ms(0)
        );
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        for flag in [
            "--worker-id=32",
            "--worker-id=-1",
            "--data-center-id=40",
            "--epoch-ms=18446744073709551615",
        ] {
            let args = CliArgs::try_parse_from(["snowmint", flag, "generate"]).unwrap();
            let err = SnowflakeConfig::try_from(&args).unwrap_err();
            assert!(err.to_string().contains("invalid generator configuration"));
        }
    }

    #[test]
    fn decode_requires_ids() {
        assert!(CliArgs::try_parse_from(["snowmint", "decode"]).is_err());
        let args = CliArgs::try_parse_from(["snowmint", "decode", "1", "2"]).unwrap();
        assert_eq!(args.command, Command::Decode { ids: vec![1, 2] });
    }
}
