//! Per-job chunk-delta migration protocol: fetch the source manifest, copy
//! only the chunks the destination is missing, then install the manifest.
//! Chunk copies run through a bounded-concurrency stream pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures::stream::{self, TryStreamExt};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};

use crate::http_client::HttpClient;
use crate::rate_limit::RateLimiter;
use crate::retry::{retry_async, RetryPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestWire {
    object_id: String,
    size_bytes: i64,
    chunk_size: i64,
    chunks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub total_chunks: usize,
    pub missing_chunks: usize,
    pub copied_chunks: usize,
}

pub struct MigrationEngine {
    http: HttpClient,
    limiter: Arc<RateLimiter>,
    max_concurrency: usize,
    retry_policy: RetryPolicy,
}

impl MigrationEngine {
    pub fn new(http: HttpClient, limiter: Arc<RateLimiter>, max_concurrency: usize) -> Self {
        Self {
            http,
            limiter,
            max_concurrency: max_concurrency.max(1),
            retry_policy: RetryPolicy::default(),
        }
    }

    async fn fetch_manifest(&self, base: &str, object_id: &str) -> Result<ManifestWire> {
        let url = format!("{}/objects/{}/manifest", base.trim_end_matches('/'), object_id);
        let manifest: ManifestWire = retry_async(&self.retry_policy, |e: &crate::error::TransportError| e.is_retryable(), || self.http.get_json(&url))
            .await
            .with_context(|| format!("fetching manifest for {object_id} from {base}"))?;
        if manifest.chunks.is_empty() {
            bail!("manifest for {object_id} has no chunks");
        }
        Ok(manifest)
    }

    async fn chunk_exists_at(&self, base: &str, hash: &str) -> Result<bool> {
        let url = format!("{}/chunks/{}", base.trim_end_matches('/'), hash);
        retry_async(&self.retry_policy, |e: &crate::error::TransportError| e.is_retryable(), || async {
            let status = self.http.head_status(&url).await?;
            match status {
                StatusCode::OK => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                other => Err(crate::error::TransportError::Status {
                    status: other,
                    url: url.clone(),
                    body: String::new(),
                }),
            }
        })
        .await
        .with_context(|| format!("probing chunk {hash} at {base}"))
    }

    async fn copy_chunk(&self, src_base: &str, dst_base: &str, hash: &str) -> Result<()> {
        let src_url = format!("{}/chunks/{}", src_base.trim_end_matches('/'), hash);
        let dst_url = format!("{}/chunks/{}", dst_base.trim_end_matches('/'), hash);

        retry_async(&self.retry_policy, |e: &crate::error::TransportError| e.is_retryable(), || async {
            self.limiter.acquire().await;
            let bytes = self.http.get_bytes(&src_url).await?;
            self.http.put_bytes(&dst_url, bytes).await
        })
        .await
        .with_context(|| format!("copying chunk {hash} from {src_base} to {dst_base}"))
    }

    async fn install_manifest(&self, dst_base: &str, manifest: &ManifestWire) -> Result<()> {
        let url = format!(
            "{}/objects/{}/manifest",
            dst_base.trim_end_matches('/'),
            manifest.object_id
        );
        let body = serde_json::json!({
            "size_bytes": manifest.size_bytes,
            "chunk_size": manifest.chunk_size,
            "chunks": manifest.chunks,
        });
        let _: serde_json::Value = retry_async(&self.retry_policy, |e: &crate::error::TransportError| e.is_retryable(), || {
            self.http.put_json(&url, &body)
        })
        .await
        .with_context(|| format!("installing manifest for {} on {dst_base}", manifest.object_id))?;
        Ok(())
    }

    /// Fetches the source manifest, copies every chunk the destination is
    /// missing, then installs the manifest on the destination -- strictly
    /// after every chunk copy has succeeded.
    pub async fn migrate(&self, src_base: &str, dst_base: &str, object_id: &str) -> Result<Report> {
        let manifest = self.fetch_manifest(src_base, object_id).await?;

        let mut seen = HashSet::new();
        let unique_hashes: Vec<&str> = manifest
            .chunks
            .iter()
            .filter(|h| seen.insert(h.as_str()))
            .map(|h| h.as_str())
            .collect();

        let mut missing = Vec::new();
        for &hash in &unique_hashes {
            if !self.chunk_exists_at(dst_base, hash).await? {
                missing.push(hash.to_string());
            }
        }

        let copied = stream::iter(missing.iter().cloned().map(Ok::<_, anyhow::Error>))
            .try_for_each_concurrent(self.max_concurrency, |hash| async move {
                self.copy_chunk(src_base, dst_base, &hash).await
            })
            .await;
        copied.with_context(|| format!("copying missing chunks for {object_id}"))?;

        self.install_manifest(dst_base, &manifest).await?;

        Ok(Report {
            total_chunks: manifest.chunks.len(),
            missing_chunks: missing.len(),
            copied_chunks: missing.len(),
        })
    }
}
