//! Environment-driven configuration for both binaries.
//!
//! One struct per binary, one environment variable per field, sane
//! defaults. Fails process startup on an invalid value instead of letting a
//! bad `PORT` surface as a panic deep inside a request handler.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = env_or(name, default);
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid {name}={raw:?}: {e}"))
}

#[derive(Debug)]
pub struct ControlPlaneConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub log_level: String,
    pub job_poll_interval: Duration,
    pub max_concurrency: usize,
    pub rate_limit_per_sec: u32,
    pub rate_limit_burst: u32,
}

impl ControlPlaneConfig {
    pub fn from_env() -> Result<Self> {
        let host = env_or("CONTROL_PLANE_HOST", "0.0.0.0");
        let port: u16 = parse_env("CONTROL_PLANE_PORT", "8000")?;
        let bind_addr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid bind address {host}:{port}"))?;

        Ok(Self {
            bind_addr,
            database_url: env_or("DATABASE_URL", "sqlite://control_plane.db"),
            log_level: env_or("LOG_LEVEL", "info"),
            job_poll_interval: Duration::from_millis(parse_env("JOB_POLL_INTERVAL_MS", "1000")?),
            max_concurrency: parse_env("MAX_CONCURRENCY", "4")?,
            rate_limit_per_sec: parse_env("RATE_LIMIT_PER_SEC", "20")?,
            rate_limit_burst: parse_env("RATE_LIMIT_BURST", "20")?,
        })
    }
}

pub struct DataPlaneConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub log_level: String,
    pub blob_root: PathBuf,
}

impl DataPlaneConfig {
    pub fn from_env() -> Result<Self> {
        let host = env_or("DATA_PLANE_HOST", "0.0.0.0");
        let port: u16 = parse_env("DATA_PLANE_PORT", "8001")?;
        let bind_addr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid bind address {host}:{port}"))?;

        Ok(Self {
            bind_addr,
            database_url: env_or("DATABASE_URL", "sqlite://data_plane.db"),
            log_level: env_or("LOG_LEVEL", "info"),
            blob_root: PathBuf::from(env_or("BLOB_ROOT", "./data/blobs")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_numeric_port() {
        std::env::set_var("CONTROL_PLANE_PORT", "not-a-number");
        let err = ControlPlaneConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("CONTROL_PLANE_PORT"));
        std::env::remove_var("CONTROL_PLANE_PORT");
    }

    #[test]
    fn applies_defaults_when_unset() {
        std::env::remove_var("DATA_PLANE_PORT");
        std::env::remove_var("BLOB_ROOT");
        let cfg = DataPlaneConfig::from_env().unwrap();
        assert_eq!(cfg.bind_addr.port(), 8001);
        assert_eq!(cfg.blob_root, PathBuf::from("./data/blobs"));
    }
}
