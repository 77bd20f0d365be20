use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tracing::debug;

/// Destination for uploaded image bytes. The HTTP handler only ever talks to
/// this trait, so the backing store (local disk here, an S3-compatible bucket
/// in other deployments) is swappable and mockable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`. Keys use `/` separators (`images/...`).
    async fn put(&self, key: &str, bytes: Bytes) -> Result<()>;
}

/// Object store backed by a directory on local disk.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for DiskStore {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating upload directory {}", parent.display()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("writing upload to {}", path.display()))?;
        debug!(key = %key, size = bytes.len(), "stored object");
        Ok(())
    }
}
