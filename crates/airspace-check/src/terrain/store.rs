//! Persistent tile tier.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

/// Key-value byte store for raw tile images, keyed `tile/{z}/{x}/{y}`.
pub trait TileStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = io::Result<Option<Vec<u8>>>> + Send;

    fn put(&self, key: &str, bytes: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// Tile store on the local filesystem, one file per key.
#[derive(Debug, Clone)]
pub struct DiskTileStore {
    root: PathBuf,
}

impl DiskTileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let mut path = self.root.clone();
        for part in key.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid tile key {key}"),
                ));
            }
            path.push(part);
        }
        path.set_extension("png");
        Ok(path)
    }
}

impl TileStore for DiskTileStore {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // readers never see a partial file
        let tmp = path.with_extension(format!("png.{}.tmp", std::process::id()));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await
    }
}
