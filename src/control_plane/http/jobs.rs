//! `POST /jobs/migrate`, `GET /jobs`, `GET /jobs/{id}`.

use std::sync::Arc;

use hyper::StatusCode;
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::{json_response, HandlerResult};

use crate::control_plane::AppState;

#[derive(Deserialize)]
pub struct MigrateReq {
    pub src_node: String,
    pub dst_node: String,
    pub object_id: String,
}

pub async fn enqueue_migrate(state: Arc<AppState>, req: MigrateReq) -> HandlerResult {
    let id = state
        .jobs
        .enqueue_migrate(&req.src_node, &req.dst_node, &req.object_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({"job_id": id, "status": "queued"}),
    ))
}

pub async fn list(state: Arc<AppState>, limit: i64) -> HandlerResult {
    let jobs = state.jobs.list(limit).await.map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(json_response(StatusCode::OK, &jobs))
}

pub async fn get(state: Arc<AppState>, id: i64) -> HandlerResult {
    let job = state
        .jobs
        .get(id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("job not found".to_string()))?;
    Ok(json_response(StatusCode::OK, &job))
}
