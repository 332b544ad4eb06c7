use std::io::Write;

use snowmint::{RandSource, Snowflake, TimeSource};

/// Writes `count` fresh IDs to `out`, one per line.
pub fn generate<T, R>(
    generator: &Snowflake<T, R>,
    count: usize,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    T: TimeSource,
    R: RandSource,
{
    tracing::info!(
        count,
        worker_id = generator.worker_id(),
        data_center_id = generator.data_center_id(),
        "generating ids"
    );
    for _ in 0..count {
        writeln!(out, "{}", generator.next_id()?)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes one JSON object per ID to `out`.
pub fn decode<T, R>(generator: &Snowflake<T, R>, ids: &[u64], out: &mut impl Write) -> anyhow::Result<()> {
    for &id in ids {
        let decoded = generator.decode(id);
        writeln!(out, "{}", serde_json::to_string(&decoded)?)?;
    }
    out.flush()?;
    Ok(())
}
