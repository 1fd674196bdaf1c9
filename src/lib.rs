//! Content-addressed object replicator.
//!
//! This crate backs two binaries that together form a two-tier replication
//! system:
//!
//! - `data-plane`: stores immutable content-addressed chunks and per-object
//!   manifests on the local filesystem, and reassembles objects on read.
//! - `control-plane`: runs a durable job queue and a single-writer job
//!   runner that migrates objects between data-plane nodes, copying only the
//!   chunks a destination is missing.
//!
//! Modules shared by both binaries live at the crate root (hashing,
//! chunking, the chunk store, the HTTP client/retry/rate-limiter trio,
//! metrics, configuration, error types). Modules specific to one plane live
//! under [`control_plane`] and [`data_plane`].

pub mod chunk_store;
pub mod chunking;
pub mod config;
pub mod db;
pub mod error;
pub mod hashing;
pub mod http_client;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod retry;

pub mod control_plane;
pub mod data_plane;

pub mod server;
