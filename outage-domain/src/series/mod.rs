pub mod step;

pub use step::{Changepoint, StepInterval, StepSeries};
