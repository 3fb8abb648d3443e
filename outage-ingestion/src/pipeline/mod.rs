use outage_domain::{
    domain::{Aggregation, OutageEvent, RawOutageRecord, TableError, TimeSeriesTable},
    queries::window,
};
use time::OffsetDateTime;

use crate::{
    cache::CsvCache,
    transform::{aggregate_outages, preprocess_outages, PreprocessOptions, TransformError},
};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("sink error: {0}")]
    Sink(String),
}

pub trait Source<T> {
    fn read(&self) -> Result<Vec<T>, PipelineError>;
}

pub trait Sink<T: ?Sized> {
    fn write(&self, input: &T) -> Result<(), PipelineError>;
}

/// Raw outage rows in, one availability table out.
pub struct Pipeline<S, K> {
    pub source: S,
    pub options: PreprocessOptions,
    pub by: Aggregation,
    /// Optional dump of the preprocessed events.
    pub events_sink: Option<Box<dyn Sink<[OutageEvent]>>>,
    /// When set, a previously persisted table is returned instead of
    /// recomputing.
    pub cache: Option<CsvCache>,
    /// Half-open `[start, end)` restriction applied before the sink.
    pub window: Option<(OffsetDateTime, OffsetDateTime)>,
    pub sink: K,
}

impl<S, K> Pipeline<S, K>
where
    S: Source<RawOutageRecord>,
    K: Sink<TimeSeriesTable>,
{
    pub fn new(source: S, options: PreprocessOptions, by: Aggregation, sink: K) -> Self {
        Self {
            source,
            options,
            by,
            events_sink: None,
            cache: None,
            window: None,
            sink,
        }
    }

    /// Read, preprocess and aggregate, without touching the cache or sink.
    pub fn compute(&self) -> Result<TimeSeriesTable, PipelineError> {
        let raw = self.source.read()?;
        let events = preprocess_outages(raw, &self.options)?;
        if let Some(events_sink) = &self.events_sink {
            events_sink.write(&events)?;
        }
        Ok(aggregate_outages(&events, self.by)?)
    }

    pub fn run(self) -> Result<TimeSeriesTable, PipelineError> {
        let table = match &self.cache {
            Some(cache) => cache.fetch_or_compute(|| self.compute())?,
            None => self.compute()?,
        };

        let table = match self.window {
            Some((start, end)) => window(&table, start, end)?,
            None => table,
        };

        self.sink.write(&table)?;
        Ok(table)
    }
}
