//! Two-tier tile cache with in-flight request coalescing.
//!
//! Lookup order is memory, persistent store, network. Concurrent misses on
//! the same key share one load. Tiles fetched from the network are written
//! to the persistent store in the background; [`TileCache::drain_writes`]
//! waits for those writes before shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use airspace_core::TileKey;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::source::TileSource;
use super::store::TileStore;

type TileBytes = Arc<Vec<u8>>;
type InFlight = Arc<OnceCell<Option<TileBytes>>>;

/// Point-in-time counters of a [`TileCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub store_hits: u64,
    pub network_fetches: u64,
    pub unavailable: u64,
    /// Loads that joined another caller's in-flight load
    pub coalesced: u64,
}

#[derive(Debug, Default)]
struct Counters {
    memory_hits: AtomicU64,
    store_hits: AtomicU64,
    network_fetches: AtomicU64,
    unavailable: AtomicU64,
    coalesced: AtomicU64,
}

pub struct TileCache<S, St> {
    source: S,
    store: Arc<St>,
    memory: DashMap<TileKey, TileBytes>,
    in_flight: DashMap<TileKey, InFlight>,
    writes: Mutex<JoinSet<()>>,
    counters: Counters,
}

impl<S: TileSource, St: TileStore> TileCache<S, St> {
    pub fn new(source: S, store: St) -> Self {
        Self {
            source,
            store: Arc::new(store),
            memory: DashMap::new(),
            in_flight: DashMap::new(),
            writes: Mutex::new(JoinSet::new()),
            counters: Counters::default(),
        }
    }

    /// Raw bytes of a tile, or `None` when it cannot be obtained.
    pub async fn get(&self, key: TileKey) -> Option<TileBytes> {
        if let Some(bytes) = self.memory.get(&key) {
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            return Some(bytes.clone());
        }

        let cell = self
            .in_flight
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let mut loaded_here = false;
        let result = cell
            .get_or_init(|| {
                loaded_here = true;
                self.load(key)
            })
            .await
            .clone();

        if loaded_here {
            self.in_flight.remove_if(&key, |_, current| Arc::ptr_eq(current, &cell));
        } else {
            self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    async fn load(&self, key: TileKey) -> Option<TileBytes> {
        // a previous leader may have finished since the check in `get`
        if let Some(bytes) = self.memory.get(&key) {
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            return Some(bytes.clone());
        }

        let storage_key = key.storage_key();
        match self.store.get(&storage_key).await {
            Ok(Some(bytes)) => {
                self.counters.store_hits.fetch_add(1, Ordering::Relaxed);
                let bytes = Arc::new(bytes);
                self.memory.insert(key, bytes.clone());
                return Some(bytes);
            }
            Ok(None) => {}
            Err(err) => warn!("Tile store read {} failed: {}", storage_key, err),
        }

        let Some(bytes) = self.source.fetch(key).await else {
            self.counters.unavailable.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        self.counters.network_fetches.fetch_add(1, Ordering::Relaxed);
        let bytes = Arc::new(bytes);
        self.memory.insert(key, bytes.clone());
        self.spawn_write(storage_key, bytes.clone()).await;
        Some(bytes)
    }

    async fn spawn_write(&self, storage_key: String, bytes: TileBytes) {
        let store = Arc::clone(&self.store);
        let mut writes = self.writes.lock().await;
        // reap finished writes
        while writes.try_join_next().is_some() {}
        writes.spawn(async move {
            match store.put(&storage_key, &bytes).await {
                Ok(()) => debug!("Stored tile {}", storage_key),
                Err(err) => warn!("Tile store write {} failed: {}", storage_key, err),
            }
        });
    }

    /// Waits for every pending persistent write. Returns how many finished.
    pub async fn drain_writes(&self) -> usize {
        let mut writes = self.writes.lock().await;
        let mut drained = 0;
        while let Some(joined) = writes.join_next().await {
            if let Err(err) = joined {
                warn!("Tile store write task failed: {}", err);
            }
            drained += 1;
        }
        drained
    }

    /// Drops every tile held in memory. The persistent tier is untouched.
    pub fn clear_memory(&self) {
        self.memory.clear();
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            store_hits: self.counters.store_hits.load(Ordering::Relaxed),
            network_fetches: self.counters.network_fetches.load(Ordering::Relaxed),
            unavailable: self.counters.unavailable.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
        }
    }
}
