use anyhow::{bail, Result};
use outage_domain::{
    domain::{OutageEvent, RawOutageRecord},
    queries::column_peak,
};
use outage_ingestion::{
    cache::CsvCache,
    config::AppConfig,
    metrics_textfile, observability,
    pipeline::{Pipeline, PipelineError, Sink, Source},
    sinks::{EventsNdjsonSink, TimeSeriesCsvSink},
    sources::{OutageCsvFileSource, OutageNdjsonFileSource},
};
use std::path::{Path, PathBuf};

enum OutageSource {
    Csv(OutageCsvFileSource),
    Ndjson(OutageNdjsonFileSource),
}

impl OutageSource {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ndjson" | "jsonl") => Self::Ndjson(OutageNdjsonFileSource::new(path)),
            _ => Self::Csv(OutageCsvFileSource::new(path)),
        }
    }
}

impl Source<RawOutageRecord> for OutageSource {
    fn read(&self) -> Result<Vec<RawOutageRecord>, PipelineError> {
        match self {
            Self::Csv(s) => s.read(),
            Self::Ndjson(s) => s.read(),
        }
    }
}

fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        bail!(
            "usage: {} <outages.csv|outages.ndjson> [output.csv|-] [total|production_unit|businesstype]",
            args.first().map(String::as_str).unwrap_or("outage-ingestion")
        );
    }

    let mut cfg = AppConfig::load()?;
    if let Some(by) = args.get(3) {
        cfg.aggregate.by = by.clone();
    }
    cfg.validate()?;

    let metrics = cfg
        .metrics
        .as_ref()
        .map(|m| metrics_textfile::init(&m.textfile_path))
        .transpose()?;

    let display_offset = cfg.display_offset()?;
    let output = args
        .get(2)
        .filter(|p| p.as_str() != "-")
        .map(PathBuf::from);

    let mut pipeline = Pipeline::new(
        OutageSource::for_path(Path::new(&args[1])),
        cfg.preprocess_options()?,
        cfg.aggregation()?,
        TimeSeriesCsvSink::new(output, display_offset),
    );
    pipeline.events_sink = cfg
        .output
        .events_path
        .as_ref()
        .map(|p| -> Box<dyn Sink<[OutageEvent]>> { Box::new(EventsNdjsonSink::new(p)) });
    pipeline.cache = cfg
        .output
        .cache_path
        .as_ref()
        .map(|p| CsvCache::new(p, display_offset));
    pipeline.window = cfg.window()?;

    let table = pipeline.run()?;

    for name in table.column_names() {
        if let Some((at, peak)) = column_peak(&table, name) {
            tracing::info!(column = name, %at, peak, "peak unavailability");
        }
    }

    if let Some(metrics) = metrics {
        metrics.write()?;
    }

    Ok(())
}
