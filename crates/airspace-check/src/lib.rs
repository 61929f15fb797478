//! Airspace check application: terrain-aware penetration checking of a
//! recorded track against OpenAIP airspaces.

pub mod check;
pub mod config;
pub mod error;
pub mod terrain;

pub use check::{AirspaceCheck, CheckOptions, CheckReport};
pub use config::Config;
pub use error::CheckError;
