//! The control-plane binary's library surface: node registry, job queue,
//! job runner, and the migration engine that ties them to the data plane.

pub mod http;
pub mod job_runner;
pub mod job_store;
pub mod migration;
pub mod models;
pub mod node_store;

use std::sync::Arc;

use sqlx::SqlitePool;

use job_runner::JobRunnerHandle;
use job_store::JobStore;
use node_store::NodeStore;

/// Shared state handed to every request handler. The job runner itself is
/// not stored here -- it owns its own lifecycle as a background task; the
/// handlers only need a [`JobRunnerHandle`] to request its shutdown.
pub struct AppState {
    pub jobs: Arc<JobStore>,
    pub nodes: Arc<NodeStore>,
    pub runner: JobRunnerHandle,
    pub pool: SqlitePool,
}

impl AppState {
    pub async fn migrate_schema(jobs: &JobStore, nodes: &NodeStore) -> anyhow::Result<()> {
        jobs.migrate().await?;
        nodes.migrate().await?;
        Ok(())
    }
}
