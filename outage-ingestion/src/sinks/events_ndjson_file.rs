use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use outage_domain::domain::OutageEvent;

use crate::pipeline::{PipelineError, Sink};

/// Dumps preprocessed events, one JSON object per line.
pub struct EventsNdjsonSink {
    path: PathBuf,
}

impl EventsNdjsonSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Sink<[OutageEvent]> for EventsNdjsonSink {
    fn write(&self, input: &[OutageEvent]) -> Result<(), PipelineError> {
        let file = File::create(&self.path).map_err(|e| {
            PipelineError::Sink(format!("failed to create {}: {e}", self.path.display()))
        })?;
        let mut out = BufWriter::new(file);
        for event in input {
            serde_json::to_writer(&mut out, event)
                .map_err(|e| PipelineError::Sink(format!("failed to encode event: {e}")))?;
            out.write_all(b"\n")
                .map_err(|e| PipelineError::Sink(format!("failed to write event: {e}")))?;
        }
        out.flush()
            .map_err(|e| PipelineError::Sink(format!("failed to flush events: {e}")))?;
        tracing::debug!(path = %self.path.display(), events = input.len(), "events written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let event = OutageEvent {
            unique_id: 0,
            start: datetime!(2024-01-01 00:00:00 UTC),
            end: datetime!(2024-01-02 00:00:00 UTC),
            nominal_power: 1010.0,
            available_quantity: 0.0,
            delta: 1010.0,
            business_type: "Planned maintenance".to_string(),
            production_unit_name: "GOESGEN".to_string(),
            resource_id: Some("m-1".to_string()),
        };
        let mut second = event.clone();
        second.unique_id = 1;

        EventsNdjsonSink::new(&path)
            .write(&[event.clone(), second])
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let decoded: OutageEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(decoded, event);
        assert!(lines[0].contains("\"start\":\"2024-01-01T00:00:00Z\""));
    }
}
