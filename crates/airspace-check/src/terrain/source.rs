//! Network tile tier.

use std::future::Future;
use std::time::Duration;

use airspace_core::TileKey;
use reqwest::Client;
use tracing::{debug, warn};

/// Fetches raw tile bytes. `None` means the tile is unavailable; failures
/// are logged by the implementation and never raised.
pub trait TileSource: Send + Sync + 'static {
    fn fetch(&self, key: TileKey) -> impl Future<Output = Option<Vec<u8>>> + Send;
}

/// Terrarium tiles over HTTP at `{base}/{z}/{x}/{y}.png`.
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    client: Client,
    base_url: String,
}

impl HttpTileSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(Client::builder().timeout(timeout).build()?, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn tile_url(&self, key: TileKey) -> String {
        format!("{}/{}/{}/{}.png", self.base_url, key.zoom, key.x, key.y)
    }
}

impl TileSource for HttpTileSource {
    async fn fetch(&self, key: TileKey) -> Option<Vec<u8>> {
        let url = self.tile_url(key);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Terrain tile {} fetch failed: {}", key, err);
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("Terrain tile {} returned HTTP {}", key, response.status());
            return None;
        }
        match response.bytes().await {
            Ok(bytes) => {
                debug!("Fetched terrain tile {} ({} bytes)", key, bytes.len());
                Some(bytes.to_vec())
            }
            Err(err) => {
                warn!("Terrain tile {} body read failed: {}", key, err);
                None
            }
        }
    }
}
