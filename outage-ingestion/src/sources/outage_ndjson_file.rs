use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use outage_domain::domain::{timestamp::parse_timestamp, RawOutageRecord};

use super::parse_optional_string;
use crate::pipeline::{PipelineError, Source};

/// A newline-delimited JSON source of raw outage announcements.
///
/// Each line is an object using the CSV export's column names; `avail_qty`
/// may be a number or a string.
pub struct OutageNdjsonFileSource {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
struct NdjsonOutage {
    start: String,
    end: String,
    resolution: Option<String>,
    plant_type: Option<String>,
    docstatus: Option<String>,
    nominal_power: Option<f64>,
    avail_qty: Option<serde_json::Value>,
    businesstype: Option<String>,
    production_resource_psr_name: Option<String>,
    mrid: Option<String>,
}

impl TryFrom<NdjsonOutage> for RawOutageRecord {
    type Error = String;

    fn try_from(i: NdjsonOutage) -> Result<Self, Self::Error> {
        let available_quantity = match i.avail_qty {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => parse_optional_string(&s),
            Some(other) => Some(other.to_string()),
        };
        let text = |s: Option<String>| s.as_deref().and_then(parse_optional_string);

        Ok(RawOutageRecord {
            start: parse_timestamp(&i.start).map_err(|e| format!("invalid start: {e}"))?,
            end: parse_timestamp(&i.end).map_err(|e| format!("invalid end: {e}"))?,
            resolution: text(i.resolution),
            plant_type: text(i.plant_type),
            docstatus: text(i.docstatus),
            nominal_power: i.nominal_power,
            available_quantity,
            business_type: text(i.businesstype),
            production_unit_name: text(i.production_resource_psr_name),
            resource_id: text(i.mrid),
            extra: Vec::new(),
        })
    }
}

impl OutageNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

/// Parses NDJSON outage rows from any buffered reader. Blank lines are skipped.
pub fn read_outages_ndjson<R: BufRead>(reader: R) -> Result<Vec<RawOutageRecord>, PipelineError> {
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line
            .map_err(|e| PipelineError::Source(format!("failed to read NDJSON line: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: NdjsonOutage = serde_json::from_str(&line).map_err(|e| {
            PipelineError::Source(format!("failed to parse NDJSON line {}: {e}", idx + 1))
        })?;
        let record = RawOutageRecord::try_from(parsed)
            .map_err(|e| PipelineError::Source(format!("line {}: {e}", idx + 1)))?;
        out.push(record);
    }
    Ok(out)
}

impl Source<RawOutageRecord> for OutageNdjsonFileSource {
    fn read(&self) -> Result<Vec<RawOutageRecord>, PipelineError> {
        let file = File::open(&self.path).map_err(|e| {
            PipelineError::Source(format!("failed to open {}: {e}", self.path.display()))
        })?;
        let rows = read_outages_ndjson(BufReader::new(file))?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "outage NDJSON read");
        Ok(rows)
    }
}
