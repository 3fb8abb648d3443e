//! Domain types for ENTSOE unavailability data and the time-indexed tables
//! built from it.

pub mod domain;
pub mod queries;
pub mod series;
