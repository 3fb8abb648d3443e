use time::OffsetDateTime;

/// One row of an ENTSOE unavailability export, before any cleaning.
///
/// `available_quantity` is kept as the raw cell text; exports mix numbers and
/// numeric strings in that column and coercion is the preprocessor's job.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutageRecord {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub resolution: Option<String>,
    pub plant_type: Option<String>,
    /// Cancellation flag. `None` means the outage is still in effect.
    pub docstatus: Option<String>,
    pub nominal_power: Option<f64>,
    pub available_quantity: Option<String>,
    pub business_type: Option<String>,
    pub production_unit_name: Option<String>,
    pub resource_id: Option<String>,
    /// Values of any other export columns, in header order.
    pub extra: Vec<Option<String>>,
}

impl RawOutageRecord {
    pub fn is_cancelled(&self) -> bool {
        self.docstatus.is_some()
    }
}
