use std::collections::{BTreeMap, BTreeSet};

use outage_domain::{
    domain::{Aggregation, AvailabilityTimeSeries, OutageEvent, TimeSeriesTable, UnitKey},
    series::{StepInterval, StepSeries},
};
use time::OffsetDateTime;

use super::TransformError;

pub const TOTAL_COLUMN: &str = "total";

#[derive(Debug, Clone, Copy)]
enum Collapse {
    Max,
    Sum,
}

impl Collapse {
    /// Starting value of a fold. Sums of nothing are zero, maxima of nothing are null.
    const fn empty(self) -> Option<f64> {
        match self {
            Self::Max => None,
            Self::Sum => Some(0.0),
        }
    }

    fn apply(self, acc: Option<f64>, value: Option<f64>) -> Option<f64> {
        match (self, acc, value) {
            (_, acc, None) => acc,
            (_, None, Some(v)) => Some(v),
            (Self::Max, Some(a), Some(v)) => Some(a.max(v)),
            (Self::Sum, Some(a), Some(v)) => Some(a + v),
        }
    }
}

/// Turns a list of outage announcements into a time series of unavailable
/// capacity.
///
/// The index is every distinct `start` and `end` in `events`. Each event
/// holds its `delta` over the closed interval `[start, end]`. Within one
/// (production unit, business type) group, overlapping events resolve to
/// the largest delta; outside all of a group's events the group is null.
/// Groups are then combined according to `by`:
/// - `Total`: sum over every group, in a single `total` column;
/// - `ProductionUnit`: max over business types, one column per unit;
/// - `BusinessType`: sum over units, one column per business type.
///
/// Taking the max within a group is conservative for overlapping derates
/// of one unit and is not exact when derates are strictly additive.
pub fn aggregate_outages(
    events: &[OutageEvent],
    by: Aggregation,
) -> Result<AvailabilityTimeSeries, TransformError> {
    let index: Vec<OffsetDateTime> = events
        .iter()
        .flat_map(|e| [e.start, e.end])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Every event keeps its own interval, whatever its `unique_id`.
    let mut by_unit: BTreeMap<UnitKey, Vec<StepInterval>> = BTreeMap::new();
    for e in events {
        by_unit
            .entry(e.unit_key())
            .or_default()
            .push(StepInterval::new(e.start, e.end, e.delta));
    }

    let groups: BTreeMap<UnitKey, Vec<Option<f64>>> = by_unit
        .into_iter()
        .map(|(key, intervals)| (key, StepSeries::from_intervals(intervals).sample(&index)))
        .collect();

    let columns = match by {
        Aggregation::Total => BTreeMap::from([(
            TOTAL_COLUMN.to_string(),
            collapse(groups.values().map(Vec::as_slice), index.len(), Collapse::Sum),
        )]),
        Aggregation::ProductionUnit => {
            combine(&groups, |k| &k.production_unit_name, index.len(), Collapse::Max)
        }
        Aggregation::BusinessType => {
            combine(&groups, |k| &k.business_type, index.len(), Collapse::Sum)
        }
    };

    tracing::info!(
        events = events.len(),
        groups = groups.len(),
        timestamps = index.len(),
        columns = columns.len(),
        by = %by,
        "outages aggregated"
    );

    Ok(TimeSeriesTable::try_new(index, columns)?)
}

/// String-keyed entry point; fails on anything but the three known
/// aggregation names.
pub fn aggregate_outages_by(
    events: &[OutageEvent],
    by: &str,
) -> Result<AvailabilityTimeSeries, TransformError> {
    aggregate_outages(events, by.parse()?)
}

fn combine<F>(
    groups: &BTreeMap<UnitKey, Vec<Option<f64>>>,
    label: F,
    len: usize,
    rule: Collapse,
) -> BTreeMap<String, Vec<Option<f64>>>
where
    F: Fn(&UnitKey) -> &String,
{
    let mut members: BTreeMap<&String, Vec<&[Option<f64>]>> = BTreeMap::new();
    for (key, values) in groups {
        members.entry(label(key)).or_default().push(values.as_slice());
    }
    members
        .into_iter()
        .map(|(name, columns)| (name.clone(), collapse(columns.into_iter(), len, rule)))
        .collect()
}

fn collapse<'a, I>(columns: I, len: usize, rule: Collapse) -> Vec<Option<f64>>
where
    I: Iterator<Item = &'a [Option<f64>]>,
{
    let mut out = vec![rule.empty(); len];
    for column in columns {
        for (acc, value) in out.iter_mut().zip(column) {
            *acc = rule.apply(*acc, *value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformError;
    use outage_domain::domain::InvalidAggregation;
    use time::macros::datetime;
    use time::Duration;

    const T0: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);
    const T1: OffsetDateTime = datetime!(2024-01-02 00:00:00 UTC);
    const T2: OffsetDateTime = datetime!(2024-01-03 00:00:00 UTC);
    const T3: OffsetDateTime = datetime!(2024-01-04 00:00:00 UTC);
    const T4: OffsetDateTime = datetime!(2024-01-05 00:00:00 UTC);

    fn event(
        id: usize,
        unit: &str,
        business_type: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        nominal: f64,
        delta: f64,
    ) -> OutageEvent {
        OutageEvent {
            unique_id: id,
            start,
            end,
            nominal_power: nominal,
            available_quantity: nominal - delta,
            delta,
            business_type: business_type.to_string(),
            production_unit_name: unit.to_string(),
            resource_id: None,
        }
    }

    fn fleet() -> Vec<OutageEvent> {
        vec![
            event(0, "A", "planned", T0, T2, 1000.0, 100.0),
            event(1, "A", "planned", T1, T3, 1000.0, 150.0),
            event(2, "A", "forced", T1, T2, 1000.0, 400.0),
            event(3, "B", "forced", T2, T4, 500.0, 500.0),
            event(4, "C", "planned", T3, T3, 300.0, 30.0),
        ]
    }

    #[test]
    fn overlapping_outages_of_one_unit_take_the_maximum() {
        let events = vec![
            event(0, "A", "planned", T0, T2, 1000.0, 100.0),
            event(1, "A", "planned", T1, T3, 1000.0, 150.0),
        ];
        let table = aggregate_outages(&events, Aggregation::ProductionUnit).unwrap();

        assert_eq!(table.index(), &[T0, T1, T2, T3]);
        assert_eq!(
            table.column("A").unwrap(),
            &[Some(100.0), Some(150.0), Some(150.0), Some(150.0)]
        );
        // Nothing is extrapolated past the last event.
        assert_eq!(table.index().last(), Some(&T3));
    }

    #[test]
    fn overlap_holds_between_index_points() {
        let events = vec![
            event(0, "A", "planned", T0, T2, 1000.0, 100.0),
            event(1, "A", "planned", T1, T3, 1000.0, 150.0),
        ];
        let series = StepSeries::from_intervals(
            events.iter().map(|e| StepInterval::new(e.start, e.end, e.delta)),
        );

        assert_eq!(series.value_at(T0 + Duration::hours(12)), Some(100.0));
        assert_eq!(series.value_at(T1 + Duration::hours(12)), Some(150.0));
        assert_eq!(series.value_at(T2 + Duration::hours(12)), Some(150.0));
        assert_eq!(series.value_at(T3 + Duration::hours(12)), None);
    }

    #[test]
    fn production_unit_columns_are_null_outside_their_events() {
        let table = aggregate_outages(&fleet(), Aggregation::ProductionUnit).unwrap();

        assert_eq!(table.index(), &[T0, T1, T2, T3, T4]);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(
            table.column("A").unwrap(),
            &[Some(100.0), Some(400.0), Some(400.0), Some(150.0), None]
        );
        assert_eq!(
            table.column("B").unwrap(),
            &[None, None, Some(500.0), Some(500.0), Some(500.0)]
        );
        assert_eq!(table.column("C").unwrap(), &[None, None, None, Some(30.0), None]);
    }

    #[test]
    fn business_type_columns_sum_across_units() {
        let table = aggregate_outages(&fleet(), Aggregation::BusinessType).unwrap();

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["forced", "planned"]);
        assert_eq!(
            table.column("planned").unwrap(),
            &[Some(100.0), Some(150.0), Some(150.0), Some(180.0), Some(0.0)]
        );
        assert_eq!(
            table.column("forced").unwrap(),
            &[Some(0.0), Some(400.0), Some(900.0), Some(500.0), Some(500.0)]
        );
    }

    #[test]
    fn total_sums_every_unit_and_business_type() {
        let table = aggregate_outages(&fleet(), Aggregation::Total).unwrap();

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec![TOTAL_COLUMN]);
        assert_eq!(
            table.column(TOTAL_COLUMN).unwrap(),
            &[Some(100.0), Some(550.0), Some(1050.0), Some(680.0), Some(500.0)]
        );
    }

    #[test]
    fn total_equals_sum_of_business_type_columns() {
        let events = fleet();
        let total = aggregate_outages(&events, Aggregation::Total).unwrap();
        let per_type = aggregate_outages(&events, Aggregation::BusinessType).unwrap();

        for (pos, ts) in total.index().iter().enumerate() {
            let sum: f64 = per_type.columns().filter_map(|(_, v)| v[pos]).sum();
            assert_eq!(total.get(TOTAL_COLUMN, *ts), Some(sum));
        }
    }

    #[test]
    fn total_bounds_sum_of_production_unit_columns() {
        let events = fleet();
        let total = aggregate_outages(&events, Aggregation::Total).unwrap();
        let per_unit = aggregate_outages(&events, Aggregation::ProductionUnit).unwrap();

        for (pos, ts) in total.index().iter().enumerate() {
            let sum: f64 = per_unit.columns().filter_map(|(_, v)| v[pos]).sum();
            let total_at = total.get(TOTAL_COLUMN, *ts).unwrap();
            // Equal unless a unit is out for several business types at once.
            assert!(total_at >= sum);
        }

        // With one business type per unit the two views agree exactly.
        let single_type: Vec<OutageEvent> =
            events.into_iter().filter(|e| e.business_type == "planned").collect();
        let total = aggregate_outages(&single_type, Aggregation::Total).unwrap();
        let per_unit = aggregate_outages(&single_type, Aggregation::ProductionUnit).unwrap();
        for (pos, ts) in total.index().iter().enumerate() {
            let sum: f64 = per_unit.columns().filter_map(|(_, v)| v[pos]).sum();
            assert_eq!(total.get(TOTAL_COLUMN, *ts), Some(sum));
        }
    }

    #[test]
    fn unit_unavailability_never_exceeds_nominal_power() {
        let events = fleet();
        let table = aggregate_outages(&events, Aggregation::ProductionUnit).unwrap();

        let mut max_nominal: BTreeMap<&str, f64> = BTreeMap::new();
        for e in &events {
            let entry = max_nominal.entry(e.production_unit_name.as_str()).or_insert(f64::MIN);
            *entry = entry.max(e.nominal_power);
        }

        assert_eq!(
            table.column_names().collect::<BTreeSet<_>>(),
            max_nominal.keys().copied().collect::<BTreeSet<_>>()
        );
        for (unit, values) in table.columns() {
            for v in values.iter().flatten() {
                assert!(*v <= max_nominal[unit]);
            }
        }
    }

    #[test]
    fn zero_delta_events_keep_their_timestamps_but_no_values() {
        let events = vec![
            event(0, "A", "planned", T0, T1, 1000.0, 0.0),
            event(1, "B", "planned", T1, T2, 500.0, 50.0),
        ];
        let table = aggregate_outages(&events, Aggregation::ProductionUnit).unwrap();

        assert_eq!(table.index(), &[T0, T1, T2]);
        assert_eq!(table.column("A").unwrap(), &[None, None, None]);
        assert_eq!(table.column("B").unwrap(), &[None, Some(50.0), Some(50.0)]);

        let total = aggregate_outages(&events, Aggregation::Total).unwrap();
        assert_eq!(total.column(TOTAL_COLUMN).unwrap(), &[Some(0.0), Some(50.0), Some(50.0)]);
    }

    #[test]
    fn simultaneous_events_stay_distinct_until_collapse() {
        let events = vec![
            event(0, "A", "planned", T0, T1, 1000.0, 200.0),
            event(1, "A", "planned", T0, T1, 1000.0, 300.0),
        ];
        let table = aggregate_outages(&events, Aggregation::ProductionUnit).unwrap();
        assert_eq!(table.column("A").unwrap(), &[Some(300.0), Some(300.0)]);
    }

    #[test]
    fn repeated_unique_ids_do_not_hide_outages() {
        let events = vec![
            event(0, "A", "planned", T0, T1, 1000.0, 100.0),
            event(0, "A", "planned", T2, T3, 1000.0, 200.0),
        ];
        let table = aggregate_outages(&events, Aggregation::ProductionUnit).unwrap();

        assert_eq!(table.index(), &[T0, T1, T2, T3]);
        assert_eq!(
            table.column("A").unwrap(),
            &[Some(100.0), Some(100.0), Some(200.0), Some(200.0)]
        );
    }

    #[test]
    fn no_events_yield_an_empty_table() {
        let table = aggregate_outages(&[], Aggregation::ProductionUnit).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names().count(), 0);
    }

    #[test]
    fn string_entry_point_rejects_unknown_aggregation() {
        let err = aggregate_outages_by(&fleet(), "per_plant").unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidAggregation(InvalidAggregation("per_plant".to_string()))
        );
        assert!(err.to_string().contains("'production_unit'"));

        assert!(aggregate_outages_by(&fleet(), "businesstype").is_ok());
    }
}
