use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use outage_domain::domain::{timestamp::format_timestamp, TimeSeriesTable};
use time::UtcOffset;

use crate::pipeline::{PipelineError, Sink};

/// Writes a time-series table as CSV, either to a file or to stdout.
///
/// Index values are rendered as RFC 3339 in `display_offset`; nulls are
/// empty cells.
pub struct TimeSeriesCsvSink {
    path: Option<PathBuf>,
    display_offset: UtcOffset,
}

impl TimeSeriesCsvSink {
    pub fn new(path: Option<PathBuf>, display_offset: UtcOffset) -> Self {
        Self {
            path,
            display_offset,
        }
    }
}

pub fn write_table<W: Write>(
    table: &TimeSeriesTable,
    display_offset: UtcOffset,
    writer: W,
) -> Result<(), PipelineError> {
    let sink_err = |e: csv::Error| PipelineError::Sink(format!("failed to write CSV: {e}"));
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["timestamp"];
    header.extend(table.column_names());
    wtr.write_record(&header).map_err(sink_err)?;

    let columns: Vec<&[Option<f64>]> = table.columns().map(|(_, values)| values).collect();
    for (row, ts) in table.index().iter().enumerate() {
        let ts = format_timestamp(*ts, display_offset)
            .map_err(|e| PipelineError::Sink(format!("failed to format timestamp: {e}")))?;
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(ts);
        record.extend(
            columns
                .iter()
                .map(|values| values[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record).map_err(sink_err)?;
    }

    wtr.flush()
        .map_err(|e| PipelineError::Sink(format!("failed to flush CSV: {e}")))
}

impl Sink<TimeSeriesTable> for TimeSeriesCsvSink {
    fn write(&self, input: &TimeSeriesTable) -> Result<(), PipelineError> {
        match &self.path {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    PipelineError::Sink(format!("failed to create {}: {e}", path.display()))
                })?;
                write_table(input, self.display_offset, file)?;
                tracing::info!(
                    path = %path.display(),
                    rows = input.len(),
                    columns = input.column_names().count(),
                    "time series written"
                );
                Ok(())
            }
            None => write_table(input, self.display_offset, io::stdout().lock()),
        }
    }
}
