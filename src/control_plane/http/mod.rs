//! Request routing for the control-plane HTTP surface (C9/C5), hand-matched
//! on method and path segments -- see [`crate::server`] for why.

pub mod health;
pub mod jobs;
pub mod metrics;
pub mod nodes;

use std::sync::Arc;

use hyper::{Body, Method, Request, Response};

use crate::error::ApiError;
use crate::server::{error_response, not_found};

use super::AppState;

async fn read_json<T: serde::de::DeserializeOwned>(req: Request<Body>) -> Result<T, ApiError> {
    let bytes = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read request body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

fn query_param<'a>(req: &'a Request<Body>, key: &str) -> Option<&'a str> {
    req.uri().query().and_then(|q| {
        q.split('&')
            .find_map(|pair| pair.split_once('=').filter(|(k, _)| *k == key).map(|(_, v)| v))
    })
}

pub async fn dispatch(state: Arc<AppState>, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, ["health"]) => health::health(state).await,
        (&Method::GET, ["metrics"]) => metrics::metrics(state).await,

        (&Method::POST, ["nodes", "register"]) => match read_json(req).await {
            Ok(body) => respond(nodes::register(state, body).await),
            Err(e) => error_response(&e),
        },
        (&Method::GET, ["nodes"]) => respond(nodes::list(state).await),

        (&Method::POST, ["jobs", "migrate"]) => match read_json(req).await {
            Ok(body) => respond(jobs::enqueue_migrate(state, body).await),
            Err(e) => error_response(&e),
        },
        (&Method::GET, ["jobs"]) => {
            let limit: i64 = query_param(&req, "limit").and_then(|v| v.parse().ok()).unwrap_or(50);
            respond(jobs::list(state, limit).await)
        }
        (&Method::GET, ["jobs", id]) => match id.parse::<i64>() {
            Ok(id) => respond(jobs::get(state, id).await),
            Err(_) => error_response(&ApiError::BadRequest(format!("invalid job id {id:?}"))),
        },

        _ => not_found(),
    }
}

fn respond(result: crate::server::HandlerResult) -> Response<Body> {
    match result {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}
