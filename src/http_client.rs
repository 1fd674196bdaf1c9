//! Minimal async HTTP client over `hyper::Client`, used by the migration
//! engine. Talks to data-plane nodes on a trusted network, so this is plain
//! HTTP with no proxy or TLS handling.

use std::time::Duration;

use bytes::Bytes;
use hyper::client::{Client, HttpConnector};
use hyper::{Body, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TransportError;

pub struct HttpClient {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    async fn check_status(url: &str, response: hyper::Response<Body>) -> Result<Bytes, TransportError> {
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(TransportError::Status {
                status,
                url: url.to_string(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }

    /// Sends `request` and reads the full response body, bounded end to end
    /// by `self.timeout` -- a source that sends headers then stalls mid-body
    /// still hits the deadline.
    async fn send(&self, url: &str, request: Request<Body>) -> Result<Bytes, TransportError> {
        let roundtrip = async {
            let response = self.client.request(request).await.map_err(TransportError::from)?;
            Self::check_status(url, response).await
        };
        match tokio::time::timeout(self.timeout, roundtrip).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout { url: url.to_string() }),
        }
    }

    /// Sends `request` and returns only the status code, without reading the
    /// body. Still bounded by `self.timeout`.
    async fn send_head(&self, url: &str, request: Request<Body>) -> Result<StatusCode, TransportError> {
        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(result) => result.map(|r| r.status()).map_err(TransportError::from),
            Err(_) => Err(TransportError::Timeout { url: url.to_string() }),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        let request = Request::builder().method(Method::GET).uri(url).body(Body::empty())?;
        let body = self.send(url, request).await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: url.to_string(),
            body: format!("invalid JSON response: {e}"),
        })
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let payload = serde_json::to_vec(body).expect("serializing request body cannot fail");
        let request = Request::builder()
            .method(Method::PUT)
            .uri(url)
            .header(hyper::header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))?;
        let body = self.send(url, request).await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: url.to_string(),
            body: format!("invalid JSON response: {e}"),
        })
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Bytes, TransportError> {
        let request = Request::builder().method(Method::GET).uri(url).body(Body::empty())?;
        self.send(url, request).await
    }

    pub async fn put_bytes(&self, url: &str, data: Bytes) -> Result<(), TransportError> {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(url)
            .header(hyper::header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::from(data))?;
        self.send(url, request).await?;
        Ok(())
    }

    /// Returns the raw status code rather than an error: a 404 from `HEAD`
    /// is meaningful data to the migration engine (the chunk is absent), not
    /// a failure.
    pub async fn head_status(&self, url: &str) -> Result<StatusCode, TransportError> {
        let request = Request::builder().method(Method::HEAD).uri(url).body(Body::empty())?;
        self.send_head(url, request).await
    }
}
