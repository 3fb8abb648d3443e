use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::domain::{TableError, TimeSeriesTable};

/// Fetch a time-ordered profile for a single column within `[start, end)`.
///
/// Returns `None` when the column does not exist.
pub fn column_profile(
    table: &TimeSeriesTable,
    column: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Option<Vec<(OffsetDateTime, Option<f64>)>> {
    let values = table.column(column)?;
    let (lo, hi) = bounds(table.index(), start, end);
    Some(
        table.index()[lo..hi]
            .iter()
            .copied()
            .zip(values[lo..hi].iter().copied())
            .collect(),
    )
}

/// Restrict a table to the rows whose timestamp falls within `[start, end)`.
pub fn window(
    table: &TimeSeriesTable,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<TimeSeriesTable, TableError> {
    let (lo, hi) = bounds(table.index(), start, end);
    let columns: BTreeMap<String, Vec<Option<f64>>> = table
        .columns()
        .map(|(name, values)| (name.to_string(), values[lo..hi].to_vec()))
        .collect();
    TimeSeriesTable::try_new(table.index()[lo..hi].to_vec(), columns)
}

/// Largest value of a column and the first timestamp it occurs at.
pub fn column_peak(table: &TimeSeriesTable, column: &str) -> Option<(OffsetDateTime, f64)> {
    let values = table.column(column)?;
    table
        .index()
        .iter()
        .zip(values)
        .filter_map(|(ts, v)| v.map(|v| (*ts, v)))
        .fold(None, |best, (ts, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((ts, v)),
        })
}

fn bounds(index: &[OffsetDateTime], start: OffsetDateTime, end: OffsetDateTime) -> (usize, usize) {
    let lo = index.partition_point(|ts| *ts < start);
    let hi = index.partition_point(|ts| *ts < end).max(lo);
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_table() -> TimeSeriesTable {
        let index = vec![
            datetime!(2024-01-01 00:00:00 UTC),
            datetime!(2024-01-02 00:00:00 UTC),
            datetime!(2024-01-03 00:00:00 UTC),
            datetime!(2024-01-04 00:00:00 UTC),
        ];
        let columns = BTreeMap::from([
            ("a".to_string(), vec![Some(1.0), Some(3.0), None, Some(3.0)]),
            ("b".to_string(), vec![None, None, None, None]),
        ]);
        TimeSeriesTable::try_new(index, columns).unwrap()
    }

    #[test]
    fn profile_is_half_open() {
        let table = sample_table();
        let profile = column_profile(
            &table,
            "a",
            datetime!(2024-01-02 00:00:00 UTC),
            datetime!(2024-01-04 00:00:00 UTC),
        )
        .unwrap();

        assert_eq!(
            profile,
            vec![
                (datetime!(2024-01-02 00:00:00 UTC), Some(3.0)),
                (datetime!(2024-01-03 00:00:00 UTC), None),
            ]
        );
    }

    #[test]
    fn profile_of_unknown_column_is_none() {
        let table = sample_table();
        let start = datetime!(2024-01-01 00:00:00 UTC);
        assert!(column_profile(&table, "zzz", start, start).is_none());
    }

    #[test]
    fn window_keeps_all_columns() {
        let table = sample_table();
        let w = window(
            &table,
            datetime!(2023-12-01 00:00:00 UTC),
            datetime!(2024-01-02 12:00:00 UTC),
        )
        .unwrap();

        assert_eq!(w.len(), 2);
        assert_eq!(w.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(w.column("a").unwrap(), &[Some(1.0), Some(3.0)]);
    }

    #[test]
    fn inverted_window_is_empty() {
        let table = sample_table();
        let w = window(
            &table,
            datetime!(2024-01-03 00:00:00 UTC),
            datetime!(2024-01-01 00:00:00 UTC),
        )
        .unwrap();
        assert!(w.is_empty());
    }

    #[test]
    fn peak_reports_first_occurrence() {
        let table = sample_table();
        assert_eq!(
            column_peak(&table, "a"),
            Some((datetime!(2024-01-02 00:00:00 UTC), 3.0))
        );
        assert_eq!(column_peak(&table, "b"), None);
    }
}
