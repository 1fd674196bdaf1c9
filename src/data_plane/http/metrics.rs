//! `GET /metrics`.

use std::sync::Arc;

use hyper::{Body, Response, StatusCode};

use crate::metrics::CONTENT_TYPE;

use crate::data_plane::AppState;

pub async fn metrics(state: Arc<AppState>) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(Body::from(state.metrics.render()))
        .unwrap()
}
