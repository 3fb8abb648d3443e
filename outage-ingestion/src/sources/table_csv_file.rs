use std::{collections::BTreeMap, io::Read};

use outage_domain::domain::{timestamp::parse_timestamp, TimeSeriesTable};
use time::OffsetDateTime;

use crate::pipeline::PipelineError;

/// Reads a table previously written by `TimeSeriesCsvSink`.
///
/// The first column is the index, parsed as timestamps and normalized to
/// UTC; empty cells are nulls.
pub fn read_table<R: Read>(reader: R) -> Result<TimeSeriesTable, PipelineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
        .clone();
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut index: Vec<OffsetDateTime> = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];

    for result in rdr.records() {
        let record = result
            .map_err(|e| PipelineError::Source(format!("failed to read CSV record: {e}")))?;
        let raw_ts = record.get(0).unwrap_or("");
        index.push(
            parse_timestamp(raw_ts)
                .map_err(|e| PipelineError::Source(format!("invalid index value: {e}")))?,
        );

        for (pos, column) in columns.iter_mut().enumerate() {
            let cell = record.get(pos + 1).unwrap_or("").trim();
            let value = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().map_err(|e| {
                    PipelineError::Source(format!(
                        "invalid value '{cell}' in column '{}': {e}",
                        names[pos]
                    ))
                })?)
            };
            column.push(value);
        }
    }

    let columns: BTreeMap<String, Vec<Option<f64>>> = names.into_iter().zip(columns).collect();
    Ok(TimeSeriesTable::try_new(index, columns)?)
}
