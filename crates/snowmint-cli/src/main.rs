mod commands;
mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, Command};
use snowmint::{Snowflake, SnowflakeConfig};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    telemetry::init_tracing();

    let config = SnowflakeConfig::try_from(&args)?;
    if cfg!(debug_assertions) {
        tracing::debug!("Starting generator with full config: {config:#?}");
    }
    let generator = Snowflake::with_config(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.command {
        Command::Generate { count } => commands::generate(&generator, count, &mut out),
        Command::Decode { ids } => commands::decode(&generator, &ids, &mut out),
    }
}
