//! Request routing for the data-plane HTTP surface (C3/C4), hand-matched on
//! method and path segments rather than built on a router crate -- see
//! [`crate::server`] for why.

pub mod chunks;
pub mod health;
pub mod metrics;
pub mod objects;

use std::sync::Arc;

use hyper::{Body, Method, Request, Response};

use crate::error::ApiError;
use crate::server::{error_response, not_found};

use super::AppState;

async fn read_body(req: Request<Body>) -> Result<Vec<u8>, ApiError> {
    hyper::body::to_bytes(req.into_body())
        .await
        .map(|b| b.to_vec())
        .map_err(|e| ApiError::BadRequest(format!("failed to read request body: {e}")))
}

pub async fn dispatch(state: Arc<AppState>, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, ["health"]) => health::health(state).await,
        (&Method::GET, ["metrics"]) => metrics::metrics(state).await,

        (&Method::HEAD, ["chunks", hash]) => {
            let hash = hash.to_string();
            respond(chunks::head_chunk(state, &hash).await)
        }
        (&Method::GET, ["chunks", hash]) => {
            let hash = hash.to_string();
            respond(chunks::get_chunk(state, &hash).await)
        }
        (&Method::PUT, ["chunks", hash]) => {
            let hash = hash.to_string();
            match read_body(req).await {
                Ok(body) => respond(chunks::put_chunk(state, &hash, body).await),
                Err(e) => error_response(&e),
            }
        }

        (&Method::POST, ["objects", object_id, "ingest"]) => {
            let object_id = object_id.to_string();
            let chunk_size_header = req
                .headers()
                .get("x-chunk-size")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            match read_body(req).await {
                Ok(body) => respond(
                    objects::ingest(state, &object_id, chunk_size_header.as_deref(), body).await,
                ),
                Err(e) => error_response(&e),
            }
        }
        (&Method::GET, ["objects", object_id, "manifest"]) => {
            respond(objects::get_manifest(state, object_id).await)
        }
        (&Method::PUT, ["objects", object_id, "manifest"]) => {
            let object_id = object_id.to_string();
            match read_body(req).await {
                Ok(body) => match serde_json::from_slice(&body) {
                    Ok(parsed) => respond(objects::put_manifest(state, &object_id, parsed).await),
                    Err(e) => error_response(&ApiError::BadRequest(format!("invalid manifest body: {e}"))),
                },
                Err(e) => error_response(&e),
            }
        }
        (&Method::GET, ["objects", object_id]) => respond(objects::download(state, object_id).await),

        _ => not_found(),
    }
}

fn respond(result: crate::server::HandlerResult) -> Response<Body> {
    match result {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}
