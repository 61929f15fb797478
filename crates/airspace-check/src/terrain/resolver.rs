//! Batch elevation lookup for track positions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use airspace_core::{locate, ElevationRaster, TileKey};
use futures::future::join_all;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cache::TileCache;
use super::source::TileSource;
use super::store::TileStore;

/// Counters for one resolve call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub points: usize,
    pub tiles: usize,
    pub tiles_decoded: usize,
    pub tiles_unavailable: usize,
    /// Points left without an elevation
    pub unresolved: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    /// One entry per input point, in input order
    pub elevations: Vec<Option<f64>>,
    pub stats: ResolverStats,
}

/// Pixel positions inside one tile, with the input index they belong to.
type TileGroup = Vec<(usize, (u32, u32))>;

pub struct ElevationResolver<S, St> {
    cache: Arc<TileCache<S, St>>,
    zoom: u8,
    batch_size: usize,
    decodes: AtomicU64,
}

impl<S: TileSource, St: TileStore> ElevationResolver<S, St> {
    pub fn new(cache: Arc<TileCache<S, St>>, zoom: u8, batch_size: usize) -> Self {
        Self {
            cache,
            zoom,
            batch_size: batch_size.max(1),
            decodes: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<TileCache<S, St>> {
        &self.cache
    }

    /// Tile decodes attempted since the resolver was built.
    pub fn decodes(&self) -> u64 {
        self.decodes.load(Ordering::Relaxed)
    }

    /// Ground elevation under each `(lat, lon)`; `None` where the tile was
    /// unavailable or the position is not finite.
    pub async fn resolve_batch(&self, points: &[(f64, f64)]) -> Vec<Option<f64>> {
        self.resolve_batch_cancellable(points, &CancellationToken::new())
            .await
            .elevations
    }

    /// Like [`Self::resolve_batch`], stopping between tile batches once
    /// `cancel` fires. Points of unprocessed tiles stay `None`.
    pub async fn resolve_batch_cancellable(
        &self,
        points: &[(f64, f64)],
        cancel: &CancellationToken,
    ) -> Resolution {
        let mut elevations = vec![None; points.len()];
        let mut stats = ResolverStats {
            points: points.len(),
            ..ResolverStats::default()
        };

        let mut groups: BTreeMap<TileKey, TileGroup> = BTreeMap::new();
        for (idx, &(lat, lon)) in points.iter().enumerate() {
            if !lat.is_finite() || !lon.is_finite() {
                continue;
            }
            let (key, pixel) = locate(lat, lon, self.zoom);
            groups.entry(key).or_default().push((idx, pixel));
        }
        let groups: Vec<(TileKey, TileGroup)> = groups.into_iter().collect();
        stats.tiles = groups.len();

        for batch in groups.chunks(self.batch_size) {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            let loads = batch.iter().map(|(key, _)| self.load_raster(*key));
            let rasters = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    stats.cancelled = true;
                    break;
                }
                rasters = join_all(loads) => rasters,
            };

            for ((key, group), raster) in batch.iter().zip(rasters) {
                let Some(raster) = raster else {
                    stats.tiles_unavailable += 1;
                    continue;
                };
                stats.tiles_decoded += 1;
                for &(idx, (px, py)) in group {
                    elevations[idx] = raster.elevation_at(px, py);
                }
                debug!("Resolved {} points from tile {}", group.len(), key);
            }
        }

        stats.unresolved = elevations.iter().filter(|e| e.is_none()).count();
        if stats.unresolved > 0 {
            warn!(
                "{} of {} points have no ground elevation",
                stats.unresolved, stats.points
            );
        }
        Resolution { elevations, stats }
    }

    async fn load_raster(&self, key: TileKey) -> Option<ElevationRaster> {
        let bytes = self.cache.get(key).await?;
        self.decodes.fetch_add(1, Ordering::Relaxed);
        match ElevationRaster::decode(&bytes) {
            Ok(raster) => Some(raster),
            Err(err) => {
                warn!("Terrain tile {} could not be decoded: {}", key, err);
                None
            }
        }
    }
}
