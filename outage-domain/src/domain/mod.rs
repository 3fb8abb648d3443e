pub mod aggregation;
pub mod installed_capacity;
pub mod outage_event;
pub mod raw_outage;
pub mod table;
pub mod timestamp;

pub use aggregation::{Aggregation, InvalidAggregation};
pub use installed_capacity::InstalledCapacityRecord;
pub use outage_event::{OutageEvent, UnitKey};
pub use raw_outage::RawOutageRecord;
pub use table::{AvailabilityTimeSeries, TableError, TimeSeriesTable};
