pub mod csv_file;
pub mod events_ndjson_file;

pub use csv_file::{write_table, TimeSeriesCsvSink};
pub use events_ndjson_file::EventsNdjsonSink;
