use std::collections::{BTreeMap, BTreeSet};

use outage_domain::domain::{timestamp::year_start, InstalledCapacityRecord, TimeSeriesTable};
use time::OffsetDateTime;

use super::TransformError;

/// Cell values ENTSOE uses for "not available" in capacity exports.
const MISSING_SENTINELS: [&str; 2] = ["n/e", "-"];

/// Pivots installed-capacity rows into one column per production type,
/// indexed by the first instant of each year.
///
/// Rows with a missing field or a sentinel capacity are skipped. Duplicate
/// (year, production type) rows are averaged.
pub fn pivot_installed_capacity(
    records: &[InstalledCapacityRecord],
) -> Result<TimeSeriesTable, TransformError> {
    let mut cells: BTreeMap<(OffsetDateTime, &str), (f64, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for r in records {
        let (Some(year), Some(kind), Some(capacity)) = (
            r.year.as_deref(),
            r.production_type.as_deref(),
            r.installed_capacity_mw.as_deref(),
        ) else {
            skipped += 1;
            continue;
        };
        let capacity = capacity.trim();
        if MISSING_SENTINELS.contains(&capacity) {
            skipped += 1;
            continue;
        }

        let year_ts = year
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(year_start)
            .ok_or_else(|| TransformError::NumericCoercion {
                field: "Year",
                value: Some(year.to_string()),
                context: format!("production type {kind:?}"),
            })?;
        let mw = capacity
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| TransformError::NumericCoercion {
                field: "Installed Capacity (MW)",
                value: Some(capacity.to_string()),
                context: format!("production type {kind:?}, year {year}"),
            })?;

        let cell = cells.entry((year_ts, kind)).or_insert((0.0, 0));
        cell.0 += mw;
        cell.1 += 1;
    }

    let index: Vec<OffsetDateTime> = cells
        .keys()
        .map(|(ts, _)| *ts)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let kinds: BTreeSet<&str> = cells.keys().map(|(_, kind)| *kind).collect();

    let columns: BTreeMap<String, Vec<Option<f64>>> = kinds
        .into_iter()
        .map(|kind| {
            let values = index
                .iter()
                .map(|ts| {
                    cells
                        .get(&(*ts, kind))
                        .map(|(sum, count)| sum / *count as f64)
                })
                .collect();
            (kind.to_string(), values)
        })
        .collect();

    tracing::info!(
        rows_in = records.len(),
        skipped,
        years = index.len(),
        production_types = columns.len(),
        "installed capacity pivoted"
    );

    Ok(TimeSeriesTable::try_new(index, columns)?)
}
