//! `HEAD|GET|PUT /chunks/{hash}`: validate the hash, bump the matching
//! counter, dedupe on existence. `PUT` also hashes the body and rejects a
//! mismatch with 400.

use std::sync::Arc;

use hyper::{Body, Response, StatusCode};

use crate::error::ApiError;
use crate::hashing::{sha256_hex, validate_hash};
use crate::server::{json_response, HandlerResult};

use crate::data_plane::AppState;

fn check_hash(hash: &str) -> Result<(), ApiError> {
    validate_hash(hash).map_err(ApiError::BadRequest)
}

pub async fn head_chunk(state: Arc<AppState>, hash: &str) -> HandlerResult {
    check_hash(hash)?;
    state.metrics.chunks_head_total.inc();

    if state.chunks.exists(hash).await {
        state.metrics.dedupe_hits_total.inc();
        Ok(Response::builder().status(StatusCode::OK).body(Body::empty()).unwrap())
    } else {
        state.metrics.dedupe_misses_total.inc();
        Ok(Response::builder().status(StatusCode::NOT_FOUND).body(Body::empty()).unwrap())
    }
}

pub async fn get_chunk(state: Arc<AppState>, hash: &str) -> HandlerResult {
    check_hash(hash)?;
    state.metrics.chunks_get_total.inc();

    let data = state
        .chunks
        .read(hash)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("chunk not found".to_string()))?;

    state.metrics.bytes_out_total.inc_by(data.len() as u64);
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(data))
        .unwrap())
}

pub async fn put_chunk(state: Arc<AppState>, hash: &str, body: Vec<u8>) -> HandlerResult {
    check_hash(hash)?;
    state.metrics.chunks_put_total.inc();
    state.metrics.bytes_in_total.inc_by(body.len() as u64);

    if state.chunks.exists(hash).await {
        state.metrics.dedupe_hits_total.inc();
        return Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({"status": "exists", "hash": hash, "bytes": body.len()}),
        ));
    }

    let computed = sha256_hex(&body);
    if computed != hash {
        return Err(ApiError::BadRequest(format!(
            "body hash {computed} does not match path hash {hash}"
        )));
    }

    state
        .chunks
        .write(hash, &body)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    state.metrics.dedupe_misses_total.inc();

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({"status": "stored", "hash": hash, "bytes": body.len()}),
    ))
}
