//! `GET /health`: 200 while the database is reachable, 503 otherwise.
//! Excluded from the replicator traffic counters -- it is infrastructure,
//! not chunk or object traffic.

use std::sync::Arc;

use hyper::StatusCode;

use crate::db;
use crate::server::json_response;

use crate::data_plane::AppState;

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
