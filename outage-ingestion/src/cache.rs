use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use outage_domain::domain::TimeSeriesTable;
use tempfile::NamedTempFile;
use time::UtcOffset;

use crate::{
    pipeline::PipelineError,
    sinks::write_table,
    sources::read_table,
};

/// A computed table persisted as CSV. If the file exists it is returned
/// as-is; no staleness check is made against the inputs.
pub struct CsvCache {
    path: PathBuf,
    display_offset: UtcOffset,
}

impl CsvCache {
    pub fn new<P: Into<PathBuf>>(path: P, display_offset: UtcOffset) -> Self {
        Self {
            path: path.into(),
            display_offset,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fetch_or_compute<F>(&self, compute: F) -> Result<TimeSeriesTable, PipelineError>
    where
        F: FnOnce() -> Result<TimeSeriesTable, PipelineError>,
    {
        if self.path.exists() {
            let file = File::open(&self.path).map_err(|e| {
                PipelineError::Source(format!("failed to open {}: {e}", self.path.display()))
            })?;
            let table = read_table(file)?;
            metrics::counter!("outage_cache_hits_total").increment(1);
            tracing::info!(path = %self.path.display(), rows = table.len(), "cache hit");
            return Ok(table);
        }

        metrics::counter!("outage_cache_misses_total").increment(1);
        tracing::info!(path = %self.path.display(), "cache miss, computing");
        let table = compute()?;

        self.persist(&table)?;
        Ok(table)
    }

    /// Writes next to the target and renames over it, so a failed write
    /// never leaves a truncated cache behind.
    fn persist(&self, table: &TimeSeriesTable) -> Result<(), PipelineError> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent,
            None => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| {
            PipelineError::Sink(format!("failed to create {}: {e}", parent.display()))
        })?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| {
            PipelineError::Sink(format!("failed to create temp file in {}: {e}", parent.display()))
        })?;
        write_table(table, self.display_offset, tmp.as_file_mut())?;
        tmp.persist(&self.path).map_err(|e| {
            PipelineError::Sink(format!("failed to persist {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), rows = table.len(), "cache written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, collections::BTreeMap};
    use time::macros::{datetime, offset};
    use time::{Date, Month};

    fn table() -> TimeSeriesTable {
        let mut columns = BTreeMap::new();
        columns.insert("total".to_string(), vec![Some(100.0), None]);
        TimeSeriesTable::try_new(
            vec![
                datetime!(2024-01-01 00:00:00 UTC),
                datetime!(2024-01-02 00:00:00 UTC),
            ],
            columns,
        )
        .unwrap()
    }

    #[test]
    fn miss_computes_and_persists_then_hit_skips_compute() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path().join("nested/total.csv"), offset!(+1));
        let calls = Cell::new(0);

        let first = cache
            .fetch_or_compute(|| {
                calls.set(calls.get() + 1);
                Ok(table())
            })
            .unwrap();
        assert_eq!(first, table());
        assert!(cache.path().exists());

        let second = cache
            .fetch_or_compute(|| {
                calls.set(calls.get() + 1);
                Ok(TimeSeriesTable::default())
            })
            .unwrap();
        assert_eq!(second, table());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unwritable_table_leaves_no_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path().join("total.csv"), UtcOffset::UTC);

        // An instant that cannot be rendered as RFC 3339 fails mid-write.
        let mut columns = BTreeMap::new();
        columns.insert("total".to_string(), vec![Some(1.0), Some(2.0)]);
        let unrenderable = TimeSeriesTable::try_new(
            vec![
                Date::from_calendar_date(-1, Month::January, 1)
                    .unwrap()
                    .midnight()
                    .assume_utc(),
                datetime!(2024-01-01 00:00:00 UTC),
            ],
            columns,
        )
        .unwrap();

        assert!(cache.fetch_or_compute(|| Ok(unrenderable)).is_err());
        assert!(!cache.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn successful_write_leaves_only_the_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path().join("total.csv"), UtcOffset::UTC);
        cache.fetch_or_compute(|| Ok(table())).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("total.csv")]);
    }

    #[test]
    fn failed_compute_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path().join("total.csv"), UtcOffset::UTC);

        let err = cache
            .fetch_or_compute(|| Err(PipelineError::Source("boom".to_string())))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));
        assert!(!cache.path().exists());
    }
}
