//! The data-plane binary's library surface: chunk storage, manifest
//! persistence, and the HTTP routes built on top of both.

pub mod http;
pub mod manifest;
pub mod metrics;

use sqlx::SqlitePool;

use crate::chunk_store::ChunkStore;
use manifest::ManifestStore;
use metrics::DataPlaneMetrics;

/// Shared state handed to every request handler.
pub struct AppState {
    pub chunks: ChunkStore,
    pub manifests: ManifestStore,
    pub metrics: DataPlaneMetrics,
    pub pool: SqlitePool,
    pub default_chunk_size: usize,
}

impl AppState {
    pub fn new(chunks: ChunkStore, pool: SqlitePool) -> Self {
        Self {
            chunks,
            manifests: ManifestStore::new(pool.clone()),
            metrics: DataPlaneMetrics::default(),
            pool,
            default_chunk_size: 1024 * 1024,
        }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        self.manifests.migrate().await
    }
}
