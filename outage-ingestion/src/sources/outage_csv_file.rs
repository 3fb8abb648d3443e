use std::{fs::File, io::Read, path::PathBuf};

use csv::StringRecord;
use outage_domain::domain::{timestamp::parse_timestamp, RawOutageRecord};

use super::parse_optional_string;
use crate::pipeline::{PipelineError, Source};

const REQUIRED_COLUMNS: [&str; 9] = [
    "start",
    "end",
    "plant_type",
    "docstatus",
    "nominal_power",
    "avail_qty",
    "businesstype",
    "production_resource_psr_name",
    "mrid",
];

/// ENTSOE unavailability export reader.
///
/// Expected header columns (by name):
/// - start, end (ISO-8601 timestamps)
/// - resolution (optional)
/// - plant_type
/// - docstatus (empty unless the outage was cancelled)
/// - nominal_power
/// - avail_qty (numeric, possibly quoted)
/// - businesstype
/// - production_resource_psr_name
/// - mrid
///
/// Any other columns are carried along untouched.
pub struct OutageCsvFileSource {
    path: PathBuf,
}

impl OutageCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

/// Column positions resolved once from the header row.
struct Layout {
    start: usize,
    end: usize,
    resolution: Option<usize>,
    plant_type: usize,
    docstatus: usize,
    nominal_power: usize,
    avail_qty: usize,
    businesstype: usize,
    psr_name: usize,
    mrid: usize,
    extra: Vec<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self, PipelineError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name)
                .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in CSV header")))
        };

        let resolution = find("resolution");
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                let h = h.trim();
                h != "resolution" && !REQUIRED_COLUMNS.contains(&h)
            })
            .map(|(idx, _)| idx)
            .collect();

        Ok(Self {
            start: require("start")?,
            end: require("end")?,
            resolution,
            plant_type: require("plant_type")?,
            docstatus: require("docstatus")?,
            nominal_power: require("nominal_power")?,
            avail_qty: require("avail_qty")?,
            businesstype: require("businesstype")?,
            psr_name: require("production_resource_psr_name")?,
            mrid: require("mrid")?,
            extra,
        })
    }

    fn record_to_outage(&self, record: &StringRecord) -> Result<RawOutageRecord, PipelineError> {
        let line = record.position().map_or(0, csv::Position::line);
        let get = |idx: usize| record.get(idx).unwrap_or("");
        let optional = |idx: usize| parse_optional_string(get(idx));

        let timestamp = |idx: usize, name: &str| {
            let raw = get(idx);
            parse_timestamp(raw)
                .map_err(|e| PipelineError::Source(format!("invalid {name} on line {line}: {e}")))
        };

        let nominal_power = match optional(self.nominal_power) {
            None => None,
            Some(s) => Some(s.parse::<f64>().map_err(|e| {
                PipelineError::Source(format!("invalid nominal_power '{s}' on line {line}: {e}"))
            })?),
        };

        Ok(RawOutageRecord {
            start: timestamp(self.start, "start")?,
            end: timestamp(self.end, "end")?,
            resolution: self.resolution.and_then(optional),
            plant_type: optional(self.plant_type),
            docstatus: optional(self.docstatus),
            nominal_power,
            available_quantity: optional(self.avail_qty),
            business_type: optional(self.businesstype),
            production_unit_name: optional(self.psr_name),
            resource_id: optional(self.mrid),
            extra: self.extra.iter().map(|&idx| optional(idx)).collect(),
        })
    }
}

/// Parses a whole ENTSOE unavailability CSV from any reader.
pub fn read_outages_csv<R: Read>(reader: R) -> Result<Vec<RawOutageRecord>, PipelineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
        .clone();
    let layout = Layout::from_headers(&headers)?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result
            .map_err(|e| PipelineError::Source(format!("failed to read CSV record: {e}")))?;
        out.push(layout.record_to_outage(&record)?);
    }
    Ok(out)
}

impl Source<RawOutageRecord> for OutageCsvFileSource {
    fn read(&self) -> Result<Vec<RawOutageRecord>, PipelineError> {
        let file = File::open(&self.path).map_err(|e| {
            PipelineError::Source(format!("failed to open {}: {e}", self.path.display()))
        })?;
        let rows = read_outages_csv(file)?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "outage CSV read");
        Ok(rows)
    }
}
