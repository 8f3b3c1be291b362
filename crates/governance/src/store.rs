//! Content-addressed blob stores
//!
//! Permalinks are `<scheme>://<sha256 hex of the blob>`, so putting the same
//! bytes twice yields the same permalink.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use voty_common::{BlobStore, Error, Result};
use voty_crypto::sha256_hex;

fn content_hash<'a>(permalink: &'a str, scheme: &str) -> Option<&'a str> {
    let hash = permalink
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))?;
    let well_formed = hash.len() == 64
        && hash
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    well_formed.then_some(hash)
}

/// In-memory store, permalinks `memory://<hash>`
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub const SCHEME: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, permalink: &str) -> Result<Option<Vec<u8>>> {
        let Some(hash) = content_hash(permalink, Self::SCHEME) else {
            return Ok(None);
        };
        Ok(self.blobs.read().await.get(hash).cloned())
    }

    async fn put(&self, data: &[u8]) -> Result<String> {
        let hash = sha256_hex(data);
        let permalink = format!("{}://{}", Self::SCHEME, hash);
        self.blobs.write().await.insert(hash, data.to_vec());
        debug!("Stored {} bytes at {}", data.len(), permalink);
        Ok(permalink)
    }
}

/// Store writing one file per blob under a directory, permalinks
/// `file://<hash>`
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    base_path: PathBuf,
}

impl FileBlobStore {
    pub const SCHEME: &'static str = "file";

    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn path_of(&self, hash: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", hash))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, permalink: &str) -> Result<Option<Vec<u8>>> {
        let Some(hash) = content_hash(permalink, Self::SCHEME) else {
            return Ok(None);
        };

        match tokio::fs::read(self.path_of(hash)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(format!("Failed to read {}: {}", permalink, e))),
        }
    }

    async fn put(&self, data: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| Error::storage(format!("Failed to create directory: {}", e)))?;

        let hash = sha256_hex(data);
        tokio::fs::write(self.path_of(&hash), data)
            .await
            .map_err(|e| Error::storage(format!("Failed to write data: {}", e)))?;

        let permalink = format!("{}://{}", Self::SCHEME, hash);
        debug!("Stored {} bytes at {}", data.len(), permalink);
        Ok(permalink)
    }
}
