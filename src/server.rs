//! Shared hyper server plumbing for both planes: bind/serve/shutdown, JSON
//! response helpers, and `ApiError` -> HTTP response mapping. Routing is
//! hand-matched on `(method, path segments)` over plain
//! `hyper::service::{make_service_fn, service_fn}`, which is all a handful
//! of routes per plane needs.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use log::{error, warn};
use serde::Serialize;

use crate::error::ApiError;

pub type HandlerResult = Result<Response<Body>, ApiError>;

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    let body = serde_json::to_vec(value).expect("serializing a response body cannot fail");
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("building a response from a fixed set of valid headers cannot fail")
}

pub fn error_response(err: &ApiError) -> Response<Body> {
    let status = err.status();
    if status.is_server_error() {
        error!("request failed: {}", err.message());
    } else {
        warn!("request rejected: {}", err.message());
    }
    json_response(status, &serde_json::json!({ "error": err.message() }))
}

pub fn not_found() -> Response<Body> {
    error_response(&ApiError::NotFound("no such route".to_string()))
}

/// Binds `addr` and serves `dispatch(state, req)` for every connection until
/// `shutdown` resolves, then drains in-flight requests before returning.
pub async fn run<S, F, Fut>(
    addr: SocketAddr,
    state: Arc<S>,
    dispatch: F,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()>
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, Request<Body>) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        let dispatch = dispatch.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let state = state.clone();
                let dispatch = dispatch.clone();
                async move { Ok::<_, Infallible>(dispatch(state, req).await) }
            }))
        }
    });

    log::info!("listening on {addr}");
    Server::bind(&addr)
        .serve(make_svc)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on `SIGINT`/`SIGTERM` (unix) or `Ctrl+C` (any platform).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("installing SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
