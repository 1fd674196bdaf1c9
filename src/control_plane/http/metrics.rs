//! `GET /metrics`: counts are computed from the job/node tables at request
//! time rather than kept as separate in-process counters, since they are
//! cheap aggregate queries and this way they can never drift from the
//! store.

use std::sync::Arc;

use hyper::{Body, Response, StatusCode};

use crate::error::ApiError;
use crate::metrics::{Exposition, CONTENT_TYPE};
use crate::server::error_response;

use crate::control_plane::models::Job;
use crate::control_plane::AppState;

pub async fn metrics(state: Arc<AppState>) -> Response<Body> {
    match render(&state).await {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(hyper::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(Body::from(body))
            .unwrap(),
        Err(e) => error_response(&e),
    }
}

async fn render(state: &AppState) -> Result<String, ApiError> {
    let err = |e: anyhow::Error| ApiError::Internal(e.to_string());

    let jobs_total = state.jobs.count_all().await.map_err(err)?;
    let nodes_total = state.nodes.count().await.map_err(err)?;
    let jobs_queued = state.jobs.count_by_status(Job::QUEUED).await.map_err(err)?;
    let jobs_running = state.jobs.count_by_status(Job::RUNNING).await.map_err(err)?;
    let jobs_succeeded = state.jobs.count_by_status(Job::SUCCEEDED).await.map_err(err)?;
    let jobs_failed = state.jobs.count_by_status(Job::FAILED).await.map_err(err)?;

    Ok(Exposition::new()
        .counter("replicator_jobs_total", "Total jobs", jobs_total as u64)
        .gauge("replicator_nodes_total", "Total registered nodes", nodes_total as u64)
        .labeled_gauge_family(
            "replicator_jobs_by_status",
            "Jobs by status",
            &[
                ("status", "queued", jobs_queued as u64),
                ("status", "running", jobs_running as u64),
                ("status", "succeeded", jobs_succeeded as u64),
                ("status", "failed", jobs_failed as u64),
            ],
        )
        .render())
}
