//! Runtime configuration from environment.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub openaip_api_key: Option<String>,
    pub openaip_url: String,
    pub openaip_request_timeout_s: u64,
    pub terrain_tile_url: String,
    pub terrain_cache_dir: PathBuf,
    pub terrain_zoom: u8,
    /// Tiles fetched concurrently per batch
    pub terrain_batch_size: usize,
    pub terrain_request_timeout_s: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openaip_api_key: None,
            openaip_url: "https://api.core.openaip.net/api".to_string(),
            openaip_request_timeout_s: 30,
            terrain_tile_url: "https://s3.amazonaws.com/elevation-tiles-prod/terrarium".to_string(),
            terrain_cache_dir: env::temp_dir().join("airspace-check").join("tiles"),
            terrain_zoom: 14,
            terrain_batch_size: 10,
            terrain_request_timeout_s: 15,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            openaip_api_key: env::var("OPENAIP_API_KEY")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            openaip_url: env::var("OPENAIP_URL").unwrap_or(defaults.openaip_url),
            openaip_request_timeout_s: env::var("OPENAIP_REQUEST_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.openaip_request_timeout_s),
            terrain_tile_url: env::var("TERRAIN_TILE_URL").unwrap_or(defaults.terrain_tile_url),
            terrain_cache_dir: env::var("TERRAIN_CACHE_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.terrain_cache_dir),
            terrain_zoom: env::var("TERRAIN_ZOOM")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|z: &u8| *z <= 15)
                .unwrap_or(defaults.terrain_zoom),
            terrain_batch_size: env::var("TERRAIN_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.terrain_batch_size),
            terrain_request_timeout_s: env::var("TERRAIN_REQUEST_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.terrain_request_timeout_s),
        }
    }
}
