//! Structured logging bootstrap shared by both binaries.
//!
//! `LOG_LEVEL` sets the default filter; per-module overrides still work via
//! `RUST_LOG` since `env_logger` prefers it when present.

pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level.to_string());
    let _ = env_logger::Builder::from_env(env).try_init();
}
