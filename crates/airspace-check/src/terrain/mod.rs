//! Terrain elevation under track fixes, from Terrarium tiles.

pub mod cache;
pub mod resolver;
pub mod source;
pub mod store;

pub use cache::{CacheStats, TileCache};
pub use resolver::{ElevationResolver, Resolution, ResolverStats};
pub use source::{HttpTileSource, TileSource};
pub use store::{DiskTileStore, TileStore};
