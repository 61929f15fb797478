use airspace_core::{AirspaceError, DetectError};
use airspace_openaip::FetchError;
use thiserror::Error;

/// Failure of a whole check run, worded for the end user.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("could not download airspaces: {0}")]
    Download(#[source] FetchError),

    #[error("could not check airspaces: {0}")]
    Normalize(#[source] AirspaceError),

    #[error("could not check airspaces: {0}")]
    Check(#[source] DetectError),

    #[error("could not check airspaces: track has no usable position")]
    NoPosition,

    #[error("airspace check cancelled")]
    Cancelled,
}

impl From<FetchError> for CheckError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Download(other),
        }
    }
}
