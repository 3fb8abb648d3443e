pub mod aggregate;
pub mod fingerprint;
pub mod installed_capacity;
pub mod preprocess;

use outage_domain::domain::{InvalidAggregation, TableError};

pub use aggregate::{aggregate_outages, aggregate_outages_by};
pub use installed_capacity::pivot_installed_capacity;
pub use preprocess::{preprocess_outages, PreprocessOptions};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("plant type '{requested}' not present in data; available plant types are {available:?}")]
    InvalidPlantType {
        requested: String,
        available: Vec<String>,
    },
    #[error(transparent)]
    InvalidAggregation(#[from] InvalidAggregation),
    #[error("{field} value {value:?} is not numeric ({context})")]
    NumericCoercion {
        field: &'static str,
        value: Option<String>,
        context: String,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}
