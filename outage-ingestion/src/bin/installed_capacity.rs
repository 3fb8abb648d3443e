use anyhow::{bail, Result};
use outage_ingestion::{
    observability,
    pipeline::{Sink, Source},
    sinks::TimeSeriesCsvSink,
    sources::InstalledCapacityCsvFileSource,
    transform::pivot_installed_capacity,
};
use std::path::PathBuf;
use time::UtcOffset;

fn main() -> Result<()> {
    observability::init_tracing();

    let mut args = std::env::args().skip(1);
    let (Some(input), output) = (args.next(), args.next()) else {
        bail!("usage: installed_capacity <installed_capacity.csv> [output.csv]");
    };

    let records = InstalledCapacityCsvFileSource::new(&input).read()?;
    tracing::info!(input = %input, rows = records.len(), "installed capacity read");

    let table = pivot_installed_capacity(&records)?;
    TimeSeriesCsvSink::new(output.map(PathBuf::from), UtcOffset::UTC).write(&table)?;

    tracing::info!(
        years = table.len(),
        production_types = table.column_names().count(),
        "installed capacity pivoted"
    );
    Ok(())
}
