//! Web Mercator (slippy map) tile addressing.

use std::f64::consts::PI;
use std::fmt;

/// Edge length of a raster tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// One raster tile; stable across runs and used as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Key in the persistent tile store.
    pub fn storage_key(&self) -> String {
        format!("tile/{}", self)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

fn tiles_per_side(zoom: u8) -> f64 {
    2.0_f64.powi(zoom as i32)
}

/// Normalized Mercator y in [0, 1] for a latitude (0 at the north edge).
fn mercator_y(lat: f64) -> f64 {
    let sin_lat = lat.to_radians().sin();
    0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)
}

/// Global pixel of a position at `zoom`, clamped into the world raster.
fn global_pixel(lat: f64, lon: f64, zoom: u8) -> (u64, u64) {
    let world = tiles_per_side(zoom) * TILE_SIZE as f64;
    let max = world - 1.0;
    let gx = ((lon + 180.0) / 360.0 * world).floor().clamp(0.0, max);
    let gy = (mercator_y(lat) * world).floor().clamp(0.0, max);
    (gx as u64, gy as u64)
}

/// Covering tile and the pixel inside it, both taken from one global pixel.
pub fn locate(lat: f64, lon: f64, zoom: u8) -> (TileKey, (u32, u32)) {
    let (gx, gy) = global_pixel(lat, lon, zoom);
    let size = TILE_SIZE as u64;
    let key = TileKey {
        zoom,
        x: (gx / size) as u32,
        y: (gy / size) as u32,
    };
    (key, ((gx % size) as u32, (gy % size) as u32))
}

/// Tile covering a position, clamped into the valid tile range.
pub fn tile_for(lat: f64, lon: f64, zoom: u8) -> TileKey {
    locate(lat, lon, zoom).0
}

/// Pixel of a position inside its covering tile.
pub fn pixel_in_tile(lat: f64, lon: f64, zoom: u8) -> (u32, u32) {
    locate(lat, lon, zoom).1
}
