pub mod installed_capacity_csv_file;
pub mod outage_csv_file;
pub mod outage_ndjson_file;
pub mod table_csv_file;

pub use installed_capacity_csv_file::InstalledCapacityCsvFileSource;
pub use outage_csv_file::OutageCsvFileSource;
pub use outage_ndjson_file::OutageNdjsonFileSource;
pub use table_csv_file::read_table;

/// Empty (or whitespace-only) cells are nulls.
pub(crate) fn parse_optional_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
