//! `/objects/{id}` ingest, download, and manifest endpoints.

use std::sync::Arc;

use hyper::{Body, Response, StatusCode};
use serde::Deserialize;

use crate::chunking::iter_chunks;
use crate::error::ApiError;
use crate::hashing::sha256_hex;
use crate::server::{json_response, HandlerResult};

use crate::data_plane::manifest::Manifest;
use crate::data_plane::AppState;

fn check_object_id(id: &str) -> Result<(), ApiError> {
    if id.is_empty() || id.len() > 256 {
        return Err(ApiError::BadRequest("invalid object_id".to_string()));
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct ManifestIn {
    pub size_bytes: i64,
    pub chunk_size: i64,
    pub chunks: Vec<String>,
}

pub async fn ingest(
    state: Arc<AppState>,
    object_id: &str,
    chunk_size_header: Option<&str>,
    body: Vec<u8>,
) -> HandlerResult {
    check_object_id(object_id)?;
    state.metrics.bytes_in_total.inc_by(body.len() as u64);

    let chunk_size: usize = match chunk_size_header {
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid X-Chunk-Size {raw:?}")))?,
        None => state.default_chunk_size,
    };
    if chunk_size == 0 {
        return Err(ApiError::BadRequest("X-Chunk-Size must be > 0".to_string()));
    }

    let mut chunk_hashes = Vec::new();
    for chunk in iter_chunks(&body, chunk_size) {
        let hash = sha256_hex(chunk);
        if !state.chunks.exists(&hash).await {
            state
                .chunks
                .write(&hash, chunk)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;
        }
        chunk_hashes.push(hash);
    }

    let manifest = Manifest {
        object_id: object_id.to_string(),
        size_bytes: body.len() as i64,
        chunk_size: chunk_size as i64,
        chunks: chunk_hashes,
    };
    state
        .manifests
        .upsert(&manifest)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({
            "object_id": object_id,
            "size_bytes": manifest.size_bytes,
            "chunk_size": manifest.chunk_size,
            "chunks": manifest.chunks.len(),
        }),
    ))
}

pub async fn get_manifest(state: Arc<AppState>, object_id: &str) -> HandlerResult {
    check_object_id(object_id)?;
    let manifest = state
        .manifests
        .get(object_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("object not found".to_string()))?;
    Ok(json_response(StatusCode::OK, &manifest))
}

pub async fn put_manifest(state: Arc<AppState>, object_id: &str, body: ManifestIn) -> HandlerResult {
    check_object_id(object_id)?;
    let manifest = Manifest {
        object_id: object_id.to_string(),
        size_bytes: body.size_bytes,
        chunk_size: body.chunk_size,
        chunks: body.chunks,
    };
    state
        .manifests
        .upsert(&manifest)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "manifest_saved",
            "object_id": object_id,
            "chunks": manifest.chunks.len(),
        }),
    ))
}

pub async fn download(state: Arc<AppState>, object_id: &str) -> HandlerResult {
    check_object_id(object_id)?;
    let manifest = state
        .manifests
        .get(object_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("object not found".to_string()))?;

    let mut out = Vec::with_capacity(manifest.size_bytes.max(0) as usize);
    for hash in &manifest.chunks {
        let data = state
            .chunks
            .read(hash)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .ok_or_else(|| ApiError::Internal(format!("missing chunk {hash}")))?;
        out.extend_from_slice(&data);
    }

    state.metrics.bytes_out_total.inc_by(out.len() as u64);
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(out))
        .unwrap())
}
