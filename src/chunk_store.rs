//! Content-addressed blob storage on the local filesystem.
//!
//! Chunks live at `<root>/<hash[0:2]>/<hash>`, a two-character fan-out
//! directory that bounds per-directory entry counts. Writes go to a sibling
//! `.tmp` file first and are renamed into place, so a reader never observes
//! a partially written chunk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Clone)]
pub struct ChunkStore {
    root: PathBuf,
}

impl ChunkStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<hash[0:2]>/<hash>`. Callers are expected to have already
    /// validated `hash` via [`crate::hashing::validate_hash`]; this does not
    /// re-validate, since it is on the hot path for every chunk operation.
    fn path_for(&self, hash: &str) -> PathBuf {
        let prefix = &hash[0..2];
        self.root.join(prefix).join(hash)
    }

    pub async fn exists(&self, hash: &str) -> bool {
        tokio::fs::metadata(self.path_for(hash)).await.is_ok()
    }

    /// Reads the full chunk body, or `Ok(None)` if it isn't present.
    pub async fn read(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(hash)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading chunk {hash}")),
        }
    }

    /// Idempotent: if `hash` is already stored this is a no-op. Otherwise
    /// writes to a temporary file in the same directory and renames it into
    /// place, so readers only ever see the full chunk or nothing.
    pub async fn write(&self, hash: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(hash);
        if tokio::fs::metadata(&path).await.is_ok() {
            return Ok(());
        }

        let dir = path.parent().expect("chunk path always has a parent");
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating chunk directory {}", dir.display()))?;

        let tmp_path = dir.join(format!("{hash}.tmp.{}", std::process::id()));
        tokio::fs::write(&tmp_path, data)
            .await
            .with_context(|| format!("writing temporary chunk file {}", tmp_path.display()))?;

        match tokio::fs::rename(&tmp_path, &path).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = tokio::fs::remove_file(&tmp_path).await;
                Err(e).with_context(|| format!("renaming chunk into place at {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        let hash = crate::hashing::sha256_hex(b"some chunk");

        assert!(!store.exists(&hash).await);
        store.write(&hash, b"some chunk").await.unwrap();
        assert!(store.exists(&hash).await);
        assert_eq!(store.read(&hash).await.unwrap().unwrap(), b"some chunk");
    }

    #[tokio::test]
    async fn read_miss_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        let hash = "0".repeat(64);
        assert_eq!(store.read(&hash).await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_is_idempotent_and_keeps_first_writer() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        let hash = crate::hashing::sha256_hex(b"payload");

        store.write(&hash, b"payload").await.unwrap();
        // A second write under the same key is a no-op even with different
        // bytes -- the store trusts the first writer, callers validate the
        // hash before calling write.
        store.write(&hash, b"different").await.unwrap();
        assert_eq!(store.read(&hash).await.unwrap().unwrap(), b"payload");
    }

    #[tokio::test]
    async fn stores_under_two_char_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        let hash = crate::hashing::sha256_hex(b"x");
        store.write(&hash, b"x").await.unwrap();
        assert!(dir.path().join(&hash[0..2]).join(&hash).is_file());
    }
}
