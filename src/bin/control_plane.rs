//! Control-plane process entrypoint: load config, init logging, open the
//! database, spawn the job runner, then serve HTTP until a shutdown signal
//! drains both.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use replicator::config::ControlPlaneConfig;
use replicator::control_plane::job_runner::JobRunner;
use replicator::control_plane::job_store::JobStore;
use replicator::control_plane::migration::MigrationEngine;
use replicator::control_plane::node_store::NodeStore;
use replicator::control_plane::{http, AppState};
use replicator::db;
use replicator::http_client::HttpClient;
use replicator::logging;
use replicator::rate_limit::RateLimiter;
use replicator::server;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ControlPlaneConfig::from_env()?;
    logging::init(&config.log_level);

    let pool = db::connect(&config.database_url).await?;
    let jobs = Arc::new(JobStore::new(pool.clone()));
    let nodes = Arc::new(NodeStore::new(pool.clone()));
    AppState::migrate_schema(&jobs, &nodes).await?;

    let http_client = HttpClient::new(Duration::from_secs(30));
    let limiter = Arc::new(RateLimiter::new(config.rate_limit_per_sec, config.rate_limit_burst));
    let migration = MigrationEngine::new(http_client, limiter, config.max_concurrency);

    let runner = JobRunner::new(jobs.clone(), nodes.clone(), migration, config.job_poll_interval);
    let runner_handle = runner.handle();
    log::info!("starting job runner");
    let runner_task = tokio::spawn(async move { runner.run_forever().await });

    let state = Arc::new(AppState {
        jobs,
        nodes,
        runner: runner_handle.clone(),
        pool,
    });

    server::run(config.bind_addr, state, http::dispatch, server::shutdown_signal()).await?;

    runner_handle.stop();
    runner_task.await?;
    Ok(())
}
