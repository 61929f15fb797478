#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use airspace_check::terrain::{TileSource, TileStore};
use airspace_core::TileKey;
use image::{ImageFormat, Rgb, RgbImage};

/// Uniform 256x256 Terrarium tile at `elevation_m` (whole metres).
pub fn terrarium_png(elevation_m: f64) -> Vec<u8> {
    let value = (elevation_m + 32768.0) as u32;
    let pixel = Rgb([(value / 256) as u8, (value % 256) as u8, 0]);
    let image = RgbImage::from_pixel(256, 256, pixel);
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Tile server fake: per-key tiles, an optional tile for every other key,
/// and a fetch counter.
#[derive(Clone, Default)]
pub struct FakeTiles {
    tiles: Arc<HashMap<TileKey, Vec<u8>>>,
    fallback: Option<Arc<Vec<u8>>>,
    delay: Duration,
    fetches: Arc<AtomicUsize>,
}

impl FakeTiles {
    pub fn new(tiles: impl IntoIterator<Item = (TileKey, Vec<u8>)>) -> Self {
        Self {
            tiles: Arc::new(tiles.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn everywhere(bytes: Vec<u8>) -> Self {
        Self {
            fallback: Some(Arc::new(bytes)),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl TileSource for FakeTiles {
    async fn fetch(&self, key: TileKey) -> Option<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.tiles
            .get(&key)
            .cloned()
            .or_else(|| self.fallback.as_ref().map(|b| b.to_vec()))
    }
}

/// In-memory persistent tier.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    puts: Arc<AtomicUsize>,
    broken: bool,
}

impl MemoryStore {
    /// Store whose every operation fails.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.entries.lock().unwrap().insert(key.to_string(), bytes);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl TileStore for MemoryStore {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        if self.broken {
            return Err(io::Error::other("store offline"));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(io::Error::other("store offline"));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Canned HTTP reply: status line and body.
pub struct Reply {
    pub status: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One-shot HTTP/1.1 server on a loopback port. Answers one connection per
/// reply, in order, and records each request line.
pub async fn serve(replies: Vec<Reply>) -> (String, Arc<Mutex<Vec<String>>>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    tokio::spawn(async move {
        for reply in replies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&chunk[..n]),
                }
            }
            let line = String::from_utf8_lossy(&head)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            seen.lock().unwrap().push(line);
            let header = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reply.status,
                reply.body.len()
            );
            let _ = socket.write_all(header.as_bytes()).await;
            let _ = socket.write_all(&reply.body).await;
            let _ = socket.shutdown().await;
        }
    });
    (base_url, requests)
}

/// reqwest client that ignores proxy settings of the test host.
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
