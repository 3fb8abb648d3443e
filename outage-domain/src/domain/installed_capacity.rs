/// One row of an ENTSOE "installed capacity per production type" export.
///
/// All fields are raw cell text; the capacity column uses `"n/e"` and `"-"`
/// as missing-value sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledCapacityRecord {
    pub year: Option<String>,
    pub production_type: Option<String>,
    pub installed_capacity_mw: Option<String>,
}
