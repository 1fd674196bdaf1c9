//! `POST /nodes/register`, `GET /nodes`.

use std::sync::Arc;

use hyper::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::server::{json_response, HandlerResult};

use crate::control_plane::node_store::RegisterOutcome;
use crate::control_plane::AppState;

#[derive(Deserialize)]
pub struct NodeRegisterReq {
    pub name: String,
    pub base_url: String,
}

fn validate_base_url(raw: &str) -> Result<(), ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::BadRequest(format!("invalid base_url: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ApiError::BadRequest("base_url must be http or https".to_string()));
    }
    Ok(())
}

pub async fn register(state: Arc<AppState>, req: NodeRegisterReq) -> HandlerResult {
    if req.name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    validate_base_url(&req.base_url)?;

    let outcome = state
        .nodes
        .register(&req.name, &req.base_url)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let message = match outcome {
        RegisterOutcome::Registered => "registered",
        RegisterOutcome::Updated => "updated",
    };

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({
            "message": message,
            "node": {"name": req.name, "base_url": req.base_url},
        }),
    ))
}

pub async fn list(state: Arc<AppState>) -> HandlerResult {
    let nodes = state.nodes.list().await.map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(json_response(StatusCode::OK, &nodes))
}
