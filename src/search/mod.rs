//! Property search: translates an arbitrary subset of filter criteria into
//! one parameterized query joining properties with their location.

pub mod builder;
pub mod criteria;

pub use builder::{SearchQuery, SqlParam};
pub use criteria::{SearchCriteria, SearchParams};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid value for {field}: {value}")]
    InvalidCriterion { field: &'static str, value: String },

    #[error("latitude and longitude must be supplied together")]
    IncompleteCenterPoint,
}
