//! Manifest persistence: `object_id -> (size_bytes, chunk_size, chunks)`
//! backed by the `object_manifests` table. The chunk list is stored as a
//! JSON array in one column and is never exposed as raw JSON through the
//! HTTP surface -- callers always get a decoded `chunks: [...]` array.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub object_id: String,
    pub size_bytes: i64,
    pub chunk_size: i64,
    pub chunks: Vec<String>,
}

pub struct ManifestStore {
    pool: SqlitePool,
}

impl ManifestStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS object_manifests (
                object_id TEXT PRIMARY KEY,
                size_bytes INTEGER NOT NULL,
                chunk_size INTEGER NOT NULL,
                chunks_json TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("creating object_manifests table")?;
        Ok(())
    }

    pub async fn get(&self, object_id: &str) -> Result<Option<Manifest>> {
        let row: Option<(i64, i64, String)> = sqlx::query_as(
            "SELECT size_bytes, chunk_size, chunks_json FROM object_manifests WHERE object_id = ?",
        )
        .bind(object_id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching manifest")?;

        let Some((size_bytes, chunk_size, chunks_json)) = row else {
            return Ok(None);
        };
        let chunks: Vec<String> =
            serde_json::from_str(&chunks_json).context("decoding stored chunks_json")?;
        Ok(Some(Manifest {
            object_id: object_id.to_string(),
            size_bytes,
            chunk_size,
            chunks,
        }))
    }

    /// Last-writer-wins: inserts or overwrites whatever was there before.
    pub async fn upsert(&self, manifest: &Manifest) -> Result<()> {
        let chunks_json = serde_json::to_string(&manifest.chunks).expect("chunk list is always serializable");
        sqlx::query(
            "INSERT INTO object_manifests (object_id, size_bytes, chunk_size, chunks_json)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(object_id) DO UPDATE SET
                size_bytes = excluded.size_bytes,
                chunk_size = excluded.chunk_size,
                chunks_json = excluded.chunks_json",
        )
        .bind(&manifest.object_id)
        .bind(manifest.size_bytes)
        .bind(manifest.chunk_size)
        .bind(chunks_json)
        .execute(&self.pool)
        .await
        .context("upserting manifest")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> ManifestStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let store = ManifestStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn missing_manifest_is_none() {
        let store = store().await;
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = store().await;
        let manifest = Manifest {
            object_id: "hello".to_string(),
            size_bytes: 11,
            chunk_size: 5,
            chunks: vec!["a".repeat(64), "b".repeat(64), "c".repeat(64)],
        };
        store.upsert(&manifest).await.unwrap();
        assert_eq!(store.get("hello").await.unwrap().unwrap(), manifest);
    }

    #[tokio::test]
    async fn second_upsert_overwrites() {
        let store = store().await;
        let first = Manifest {
            object_id: "obj".to_string(),
            size_bytes: 1,
            chunk_size: 1,
            chunks: vec!["a".repeat(64)],
        };
        let second = Manifest {
            object_id: "obj".to_string(),
            size_bytes: 2,
            chunk_size: 1,
            chunks: vec!["a".repeat(64), "b".repeat(64)],
        };
        store.upsert(&first).await.unwrap();
        store.upsert(&second).await.unwrap();
        assert_eq!(store.get("obj").await.unwrap().unwrap(), second);
    }
}
