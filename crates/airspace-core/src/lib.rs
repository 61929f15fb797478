//! Core logic for airspace penetration checks on recorded flight tracks.
//!
//! Everything in this crate is pure computation: decoding airspace records
//! into a comparable form, deciding which ones matter, mapping positions onto
//! terrain tiles and deciding which fixes of a track are inside which volume.
//! Network and cache I/O live in the `airspace-openaip` and `airspace-check`
//! crates.

pub mod altitude;
pub mod classify;
pub mod error;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod terrarium;
pub mod tile;
pub mod violation;

pub use altitude::{AltitudeUnit, ReferenceDatum};
pub use classify::{AirspaceType, IcaoClass};
pub use error::{AirspaceError, DetectError, RasterError};
pub use filter::{should_keep, AirspaceFilter};
pub use models::{
    AirspaceGeometry, AirspaceHit, BoundingBox, Fix, NormalizedAirspace, RawAirspaceRecord,
    RawAltitudeLimit, RawGeometry, Track, ViolationResult,
};
pub use normalize::{normalize, normalize_all};
pub use terrarium::ElevationRaster;
pub use tile::{locate, pixel_in_tile, tile_for, TileKey, TILE_SIZE};
pub use violation::{detect, effective_band};
