pub mod table_queries;

pub use table_queries::{column_peak, column_profile, window};
