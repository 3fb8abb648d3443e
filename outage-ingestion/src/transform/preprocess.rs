use std::collections::HashSet;

use outage_domain::domain::{OutageEvent, RawOutageRecord};
use time::{Duration, UtcOffset};

use super::{
    fingerprint::{event_fingerprint, raw_record_fingerprint},
    TransformError,
};

/// Selection applied to raw outage announcements.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    pub plant_type: String,
    /// Keep only outages strictly longer than this. `None` disables the filter.
    pub min_duration: Option<Duration>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            plant_type: "Nuclear".to_string(),
            min_duration: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    PlantType,
    Cancelled,
    TooShort,
    MissingUnit,
}

impl Rejection {
    const fn label(self) -> &'static str {
        match self {
            Self::PlantType => "plant_type",
            Self::Cancelled => "cancelled",
            Self::TooShort => "duration",
            Self::MissingUnit => "missing_unit",
        }
    }
}

/// Cleans raw ENTSOE outage rows into the event list used for aggregation.
///
/// Steps, in order:
/// - normalize `start`/`end` to UTC and drop `resolution`;
/// - drop exact duplicate rows (first occurrence wins);
/// - check that the requested plant type occurs in the data;
/// - keep active (non-cancelled) outages of that plant type, longer than
///   `min_duration` when one is given;
/// - compute `delta = nominal_power - available_quantity`;
/// - drop duplicate output rows and number the survivors `0..N`.
///
/// Numeric coercion only applies to rows that pass the filters.
pub fn preprocess_outages(
    raw: Vec<RawOutageRecord>,
    options: &PreprocessOptions,
) -> Result<Vec<OutageEvent>, TransformError> {
    let rows_in = raw.len();
    metrics::counter!("outage_rows_read_total").increment(rows_in as u64);

    let mut seen = HashSet::with_capacity(rows_in);
    let rows: Vec<RawOutageRecord> = raw
        .into_iter()
        .map(normalize)
        .filter(|r| seen.insert(raw_record_fingerprint(r)))
        .collect();
    let duplicates = rows_in - rows.len();
    metrics::counter!("outage_duplicate_rows_total").increment(duplicates as u64);

    let available = plant_types(&rows);
    if !available.iter().any(|p| *p == options.plant_type) {
        return Err(TransformError::InvalidPlantType {
            requested: options.plant_type.clone(),
            available,
        });
    }

    let mut events: Vec<OutageEvent> = Vec::new();
    let mut seen_events = HashSet::new();
    let mut filtered = 0usize;
    for row in rows {
        if let Some(reason) = rejection(&row, options) {
            metrics::counter!("outage_rows_filtered_total", "reason" => reason.label()).increment(1);
            filtered += 1;
            continue;
        }

        let event = to_event(row, events.len()).inspect_err(|_| {
            metrics::counter!("outage_numeric_coercion_errors_total").increment(1);
        })?;
        if seen_events.insert(event_fingerprint(&event)) {
            events.push(event);
        } else {
            metrics::counter!("outage_duplicate_rows_total").increment(1);
        }
    }
    metrics::counter!("outage_events_total").increment(events.len() as u64);

    tracing::info!(
        rows_in,
        duplicates,
        filtered,
        events = events.len(),
        plant_type = %options.plant_type,
        "outage rows preprocessed"
    );

    Ok(events)
}

fn normalize(mut row: RawOutageRecord) -> RawOutageRecord {
    row.start = row.start.to_offset(UtcOffset::UTC);
    row.end = row.end.to_offset(UtcOffset::UTC);
    row.resolution = None;
    row
}

/// Distinct plant types in first-appearance order.
fn plant_types(rows: &[RawOutageRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|r| r.plant_type.as_deref())
        .filter(|p| seen.insert(*p))
        .map(str::to_string)
        .collect()
}

fn rejection(row: &RawOutageRecord, options: &PreprocessOptions) -> Option<Rejection> {
    if row.plant_type.as_deref() != Some(options.plant_type.as_str()) {
        return Some(Rejection::PlantType);
    }
    if row.is_cancelled() {
        return Some(Rejection::Cancelled);
    }
    if let Some(min) = options.min_duration {
        if row.end - row.start <= min {
            return Some(Rejection::TooShort);
        }
    }
    if row.production_unit_name.is_none() || row.business_type.is_none() {
        return Some(Rejection::MissingUnit);
    }
    None
}

fn to_event(row: RawOutageRecord, unique_id: usize) -> Result<OutageEvent, TransformError> {
    let context = || {
        format!(
            "unit {:?}, outage starting {}",
            row.production_unit_name.as_deref().unwrap_or_default(),
            row.start
        )
    };

    let nominal_power = row
        .nominal_power
        .filter(|v| v.is_finite())
        .ok_or_else(|| TransformError::NumericCoercion {
            field: "nominal_power",
            value: row.nominal_power.map(|v| v.to_string()),
            context: context(),
        })?;

    let available_quantity = row
        .available_quantity
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| TransformError::NumericCoercion {
            field: "available_quantity",
            value: row.available_quantity.clone(),
            context: context(),
        })?;

    Ok(OutageEvent {
        unique_id,
        start: row.start,
        end: row.end,
        nominal_power,
        available_quantity,
        delta: nominal_power - available_quantity,
        business_type: row.business_type.unwrap_or_default(),
        production_unit_name: row.production_unit_name.unwrap_or_default(),
        resource_id: row.resource_id,
    })
}
