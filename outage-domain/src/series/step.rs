//! Changepoint representation of overlapping constant-valued intervals.
//!
//! Intervals are closed: a value recorded for `[start, end]` is still in
//! effect at `end`. Where intervals overlap, the largest value wins.

use time::OffsetDateTime;

/// A constant `value` in effect over the closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInterval {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub value: f64,
}

impl StepInterval {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime, value: f64) -> Self {
        // A reversed interval still spans the two instants it names.
        if end < start {
            Self { start: end, end: start, value }
        } else {
            Self { start, end, value }
        }
    }
}

/// State of the series at one boundary instant and on the open segment
/// up to the next boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Changepoint {
    pub at: OffsetDateTime,
    pub value_at: Option<f64>,
    pub value_after: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepSeries {
    changepoints: Vec<Changepoint>,
}

impl StepSeries {
    /// Builds the series by sweeping interval boundaries in time order.
    ///
    /// Zero-valued intervals carry no information and are dropped.
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = StepInterval>,
    {
        let mut intervals: Vec<StepInterval> = intervals
            .into_iter()
            .filter(|i| i.value != 0.0)
            .map(|i| StepInterval::new(i.start, i.end, i.value))
            .collect();
        intervals.sort_by_key(|i| i.start);

        let mut bounds: Vec<OffsetDateTime> =
            intervals.iter().flat_map(|i| [i.start, i.end]).collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut changepoints = Vec::with_capacity(bounds.len());
        let mut active: Vec<StepInterval> = Vec::new();
        let mut next = 0;

        for at in bounds {
            while next < intervals.len() && intervals[next].start == at {
                active.push(intervals[next]);
                next += 1;
            }
            let value_at = max_value(&active);
            active.retain(|i| i.end > at);
            let value_after = max_value(&active);

            changepoints.push(Changepoint {
                at,
                value_at,
                value_after,
            });
        }

        Self { changepoints }
    }

    pub fn changepoints(&self) -> &[Changepoint] {
        &self.changepoints
    }

    pub fn is_empty(&self) -> bool {
        self.changepoints.is_empty()
    }

    pub fn first(&self) -> Option<OffsetDateTime> {
        self.changepoints.first().map(|c| c.at)
    }

    pub fn last(&self) -> Option<OffsetDateTime> {
        self.changepoints.last().map(|c| c.at)
    }

    /// Value in effect at `ts`; `None` outside every interval.
    pub fn value_at(&self, ts: OffsetDateTime) -> Option<f64> {
        match self.changepoints.binary_search_by(|c| c.at.cmp(&ts)) {
            Ok(pos) => self.changepoints[pos].value_at,
            Err(0) => None,
            Err(pos) => self.changepoints[pos - 1].value_after,
        }
    }

    /// Evaluates the series at every entry of `index`.
    pub fn sample(&self, index: &[OffsetDateTime]) -> Vec<Option<f64>> {
        index.iter().map(|&ts| self.value_at(ts)).collect()
    }
}

fn max_value(active: &[StepInterval]) -> Option<f64> {
    active.iter().map(|i| i.value).reduce(f64::max)
}
