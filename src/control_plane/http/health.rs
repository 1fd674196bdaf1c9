//! `GET /health`: mirrors the data-plane endpoint.

use std::sync::Arc;

use hyper::StatusCode;

use crate::db;
use crate::server::json_response;

use crate::control_plane::AppState;

pub async fn health(state: Arc<AppState>) -> hyper::Response<hyper::Body> {
    if db::is_reachable(&state.pool).await {
        json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}))
    } else {
        json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &serde_json::json!({"status": "database unreachable"}),
        )
    }
}
