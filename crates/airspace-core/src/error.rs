//! Error types shared by the core modules.

use thiserror::Error;

/// Data-quality faults in an airspace record received from upstream.
///
/// These are never retried: they mean the API broke its data contract.
#[derive(Debug, Error)]
pub enum AirspaceError {
    #[error("Invalid unit ({0})")]
    InvalidUnit(i64),

    #[error("Invalid datum ({0})")]
    InvalidDatum(i64),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Rejection of the inputs handed to the violation detector.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Invalid track or ground data: {0}")]
    InputValidation(String),
}

/// Failure to turn tile bytes into an elevation raster.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("tile decode failed: {0}")]
    Decode(#[from] image::ImageError),
}
