//! Data-plane process entrypoint: load config, init logging, open the
//! database and blob root, then serve HTTP until a shutdown signal.

use std::sync::Arc;

use anyhow::Result;

use replicator::chunk_store::ChunkStore;
use replicator::config::DataPlaneConfig;
use replicator::data_plane::{http, AppState};
use replicator::db;
use replicator::logging;
use replicator::server;

#[tokio::main]
async fn main() -> Result<()> {
    let config = DataPlaneConfig::from_env()?;
    logging::init(&config.log_level);

    let pool = db::connect(&config.database_url).await?;
    let chunks = ChunkStore::new(config.blob_root.clone());
    let state = Arc::new(AppState::new(chunks, pool));
    state.migrate().await?;

    server::run(config.bind_addr, state, http::dispatch, server::shutdown_signal()).await
}
