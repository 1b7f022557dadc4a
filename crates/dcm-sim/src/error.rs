//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while setting up a simulation run.
///
/// Numerical divergence during integration is not an error; it shows up as
/// non-finite samples in the returned trace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn invalid(what: impl Into<String>) -> Self {
        SimError::InvalidParameter { what: what.into() }
    }
}

impl From<dcm_core::CoreError> for SimError {
    fn from(e: dcm_core::CoreError) -> Self {
        SimError::InvalidParameter {
            what: e.to_string(),
        }
    }
}
