use std::{fs::File, io::Read, path::PathBuf};

use outage_domain::domain::InstalledCapacityRecord;

use super::parse_optional_string;
use crate::pipeline::{PipelineError, Source};

/// ENTSOE "installed capacity per production type" export.
///
/// Expected header columns (by name):
/// - Year
/// - Production Type
/// - Installed Capacity (MW)
pub struct InstalledCapacityCsvFileSource {
    path: PathBuf,
}

impl InstalledCapacityCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

pub fn read_installed_capacity_csv<R: Read>(
    reader: R,
) -> Result<Vec<InstalledCapacityRecord>, PipelineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
        .clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in CSV header")))
    };
    let year = position("Year")?;
    let kind = position("Production Type")?;
    let capacity = position("Installed Capacity (MW)")?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result
            .map_err(|e| PipelineError::Source(format!("failed to read CSV record: {e}")))?;
        let get = |idx: usize| record.get(idx).and_then(parse_optional_string);
        out.push(InstalledCapacityRecord {
            year: get(year),
            production_type: get(kind),
            installed_capacity_mw: get(capacity),
        });
    }
    Ok(out)
}

impl Source<InstalledCapacityRecord> for InstalledCapacityCsvFileSource {
    fn read(&self) -> Result<Vec<InstalledCapacityRecord>, PipelineError> {
        let file = File::open(&self.path).map_err(|e| {
            PipelineError::Source(format!("failed to open {}: {e}", self.path.display()))
        })?;
        read_installed_capacity_csv(file)
    }
}
