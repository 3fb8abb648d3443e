use time::{Duration, OffsetDateTime};

/// A cleaned outage announcement, as produced by preprocessing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutageEvent {
    pub unique_id: usize,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub start: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub end: OffsetDateTime,
    pub nominal_power: f64,
    pub available_quantity: f64,
    /// Capacity removed from service: `nominal_power - available_quantity`.
    pub delta: f64,
    pub business_type: String,
    pub production_unit_name: String,
    pub resource_id: Option<String>,
}

impl OutageEvent {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn unit_key(&self) -> UnitKey {
        UnitKey {
            production_unit_name: self.production_unit_name.clone(),
            business_type: self.business_type.clone(),
        }
    }
}

/// Identifies one (production unit, business type) group of outages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitKey {
    pub production_unit_name: String,
    pub business_type: String,
}
