mod common;

use std::sync::Arc;
use std::time::Duration;

use airspace_check::terrain::{ElevationResolver, TileCache};
use airspace_core::{tile_for, TileKey};
use common::{terrarium_png, FakeTiles, MemoryStore};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

const ZOOM: u8 = 14;
const ALPS: (f64, f64) = (45.9237, 6.8694);
const JURA: (f64, f64) = (46.5, 6.2);

fn key(point: (f64, f64)) -> TileKey {
    tile_for(point.0, point.1, ZOOM)
}

fn resolver(tiles: FakeTiles, store: MemoryStore, batch: usize) -> ElevationResolver<FakeTiles, MemoryStore> {
    ElevationResolver::new(Arc::new(TileCache::new(tiles, store)), ZOOM, batch)
}

#[tokio::test]
async fn results_follow_input_order() {
    let tiles = FakeTiles::new([
        (key(ALPS), terrarium_png(2400.0)),
        (key(JURA), terrarium_png(800.0)),
    ]);
    let resolver = resolver(tiles.clone(), MemoryStore::default(), 10);

    let alps_nearby = (ALPS.0 + 0.0001, ALPS.1 + 0.0001);
    let points = [ALPS, JURA, alps_nearby, (f64::NAN, 6.0), JURA];
    let resolution = resolver
        .resolve_batch_cancellable(&points, &CancellationToken::new())
        .await;

    assert_eq!(
        resolution.elevations,
        vec![Some(2400.0), Some(800.0), Some(2400.0), None, Some(800.0)]
    );
    assert_eq!(resolution.stats.tiles, 2);
    assert_eq!(resolution.stats.tiles_decoded, 2);
    assert_eq!(resolution.stats.unresolved, 1);
    // one fetch per distinct tile
    assert_eq!(tiles.fetches(), 2);
}

#[tokio::test]
async fn unavailable_tile_leaves_gaps() {
    let tiles = FakeTiles::new([(key(ALPS), terrarium_png(2400.0))]);
    let resolver = resolver(tiles, MemoryStore::default(), 10);

    let resolution = resolver
        .resolve_batch_cancellable(&[JURA, ALPS], &CancellationToken::new())
        .await;
    assert_eq!(resolution.elevations, vec![None, Some(2400.0)]);
    assert_eq!(resolution.stats.tiles_unavailable, 1);
    assert_eq!(resolver.cache().stats().unavailable, 1);
}

#[tokio::test]
async fn undecodable_tile_is_unavailable() {
    let tiles = FakeTiles::new([(key(ALPS), b"<html>rate limited</html>".to_vec())]);
    let resolver = resolver(tiles, MemoryStore::default(), 10);
    assert_eq!(resolver.resolve_batch(&[ALPS]).await, vec![None]);
}

#[tokio::test]
async fn small_batches_cover_every_tile() {
    let points: Vec<(f64, f64)> = (0..7).map(|i| (45.0 + i as f64 * 0.1, 6.0)).collect();
    let tiles = FakeTiles::everywhere(terrarium_png(300.0));
    let resolver = resolver(tiles.clone(), MemoryStore::default(), 2);

    let elevations = resolver.resolve_batch(&points).await;
    assert_eq!(elevations, vec![Some(300.0); 7]);
    assert_eq!(tiles.fetches(), 7);
}

#[tokio::test]
async fn persistent_tier_is_read_before_network() {
    let store = MemoryStore::default();
    store.insert(&key(ALPS).storage_key(), terrarium_png(1500.0));
    let tiles = FakeTiles::everywhere(terrarium_png(9999.0));
    let resolver = resolver(tiles.clone(), store, 10);

    assert_eq!(resolver.resolve_batch(&[ALPS]).await, vec![Some(1500.0)]);
    assert_eq!(tiles.fetches(), 0);
    assert_eq!(resolver.cache().stats().store_hits, 1);
}

#[tokio::test]
async fn network_tiles_are_written_through() {
    let store = MemoryStore::default();
    let tiles = FakeTiles::everywhere(terrarium_png(700.0));
    let cache = TileCache::new(tiles.clone(), store.clone());

    assert!(cache.get(key(JURA)).await.is_some());
    assert_eq!(cache.drain_writes().await, 1);
    assert_eq!(store.keys(), vec![key(JURA).storage_key()]);

    // memory tier answers until cleared, then the store does
    assert!(cache.get(key(JURA)).await.is_some());
    assert_eq!(cache.stats().memory_hits, 1);
    cache.clear_memory();
    assert_eq!(cache.memory_len(), 0);
    assert!(cache.get(key(JURA)).await.is_some());
    assert_eq!(cache.stats().store_hits, 1);
    assert_eq!(tiles.fetches(), 1);
}

#[tokio::test]
async fn broken_store_falls_back_to_network() {
    let store = MemoryStore::broken();
    let tiles = FakeTiles::everywhere(terrarium_png(100.0));
    let cache = TileCache::new(tiles.clone(), store.clone());

    assert!(cache.get(key(ALPS)).await.is_some());
    cache.drain_writes().await;
    assert_eq!(store.puts(), 1);
    assert_eq!(tiles.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_misses_share_one_fetch() {
    let tiles = FakeTiles::everywhere(terrarium_png(100.0)).with_delay(Duration::from_millis(50));
    let cache = Arc::new(TileCache::new(tiles.clone(), MemoryStore::default()));

    let results = join_all((0..8).map(|_| {
        let cache = cache.clone();
        async move { cache.get(key(ALPS)).await }
    }))
    .await;

    assert!(results.iter().all(|r| r.is_some()));
    assert_eq!(tiles.fetches(), 1);
    assert_eq!(cache.stats().coalesced, 7);
}

#[tokio::test(start_paused = true)]
async fn concurrent_resolves_share_tiles() {
    let tiles = FakeTiles::everywhere(terrarium_png(100.0)).with_delay(Duration::from_millis(20));
    let resolver = Arc::new(resolver(tiles.clone(), MemoryStore::default(), 10));

    let (a, b) = tokio::join!(resolver.resolve_batch(&[ALPS, JURA]), resolver.resolve_batch(&[JURA, ALPS]));
    assert_eq!(a, vec![Some(100.0), Some(100.0)]);
    assert_eq!(b, a);
    assert_eq!(tiles.fetches(), 2);
}

#[tokio::test]
async fn cancelled_resolve_fetches_nothing() {
    let tiles = FakeTiles::everywhere(terrarium_png(100.0));
    let resolver = resolver(tiles.clone(), MemoryStore::default(), 10);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let resolution = resolver.resolve_batch_cancellable(&[ALPS, JURA], &cancel).await;
    assert!(resolution.stats.cancelled);
    assert_eq!(resolution.elevations, vec![None, None]);
    assert_eq!(tiles.fetches(), 0);
}

#[tokio::test]
async fn points_sharing_a_tile_decode_it_once() {
    let tiles = FakeTiles::new([
        (key(ALPS), terrarium_png(2400.0)),
        (key(JURA), terrarium_png(800.0)),
    ]);
    let resolver = resolver(tiles, MemoryStore::default(), 10);
    let near_alps: Vec<(f64, f64)> = (0..5)
        .map(|i| (ALPS.0 + i as f64 * 0.0001, ALPS.1 + i as f64 * 0.0001))
        .collect();

    let resolution = resolver
        .resolve_batch_cancellable(&near_alps, &CancellationToken::new())
        .await;
    assert_eq!(resolution.elevations, vec![Some(2400.0); 5]);
    assert_eq!(resolution.stats.tiles, 1);
    assert_eq!(resolver.decodes(), 1);

    // a second call decodes each of its tiles once more, memory hit or not
    let mut mixed = near_alps.clone();
    mixed.extend([JURA, JURA]);
    resolver.resolve_batch(&mixed).await;
    assert_eq!(resolver.decodes(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_gets_never_refetch_a_cached_tile() {
    let tiles = FakeTiles::everywhere(terrarium_png(100.0));
    let store = MemoryStore::default();
    let cache = Arc::new(TileCache::new(tiles.clone(), store.clone()));

    let tasks: Vec<_> = (0..64)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    assert!(cache.get(key(ALPS)).await.is_some());
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    cache.drain_writes().await;
    assert_eq!(tiles.fetches(), 1);
    assert_eq!(store.puts(), 1);
}
