//! Node and job row types. Timestamps are RFC 3339 strings generated at the
//! call site rather than left to the database.

use chrono::Utc;
use serde::Serialize;

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Node {
    pub name: String,
    pub base_url: String,
    pub status: String,
    pub last_heartbeat: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    pub kind: String,
    pub src_node: String,
    pub dst_node: String,
    pub object_id: String,
    pub status: String,
    pub retries: i64,
    pub last_error: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Job {
    pub const QUEUED: &'static str = "queued";
    pub const RUNNING: &'static str = "running";
    pub const SUCCEEDED: &'static str = "succeeded";
    pub const FAILED: &'static str = "failed";
}
