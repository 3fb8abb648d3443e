use std::{fmt, str::FromStr};

/// Dimension along which unavailability is aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// Sum over all units and business types, in a single `total` column.
    Total,
    /// One column per production unit, max across business types.
    ProductionUnit,
    /// One column per business type, summed across units.
    BusinessType,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "unknown aggregation '{0}': only implemented aggregations are 'total', \
     'businesstype' (planned/unplanned), 'production_unit'"
)]
pub struct InvalidAggregation(pub String);

impl Aggregation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::ProductionUnit => "production_unit",
            Self::BusinessType => "businesstype",
        }
    }
}

impl FromStr for Aggregation {
    type Err = InvalidAggregation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "total" => Ok(Self::Total),
            "production_unit" => Ok(Self::ProductionUnit),
            "businesstype" => Ok(Self::BusinessType),
            other => Err(InvalidAggregation(other.to_string())),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
