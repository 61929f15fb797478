//! Terrarium elevation tile decoding.
//!
//! Terrarium tiles are PNG images whose RGB channels encode elevation as
//! `red * 256 + green + blue / 256 - 32768` metres.

use image::ImageFormat;

use crate::error::RasterError;

/// Decoded elevation grid of one tile, row-major.
#[derive(Debug, Clone)]
pub struct ElevationRaster {
    width: u32,
    height: u32,
    elevations_m: Vec<f32>,
}

/// Elevation in metres encoded by one Terrarium pixel.
pub fn terrarium_elevation(red: u8, green: u8, blue: u8) -> f64 {
    red as f64 * 256.0 + green as f64 + blue as f64 / 256.0 - 32768.0
}

impl ElevationRaster {
    pub fn decode(bytes: &[u8]) -> Result<Self, RasterError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgb8();
        let (width, height) = image.dimensions();
        let elevations_m = image
            .pixels()
            .map(|pixel| {
                let [r, g, b] = pixel.0;
                terrarium_elevation(r, g, b) as f32
            })
            .collect();
        Ok(Self {
            width,
            height,
            elevations_m,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Elevation at a pixel, `None` outside the raster.
    pub fn elevation_at(&self, px: u32, py: u32) -> Option<f64> {
        if px >= self.width || py >= self.height {
            return None;
        }
        let idx = py as usize * self.width as usize + px as usize;
        self.elevations_m.get(idx).map(|value| *value as f64)
    }
}
