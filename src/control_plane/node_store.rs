//! Durable node registry. `register` is an upsert keyed by `name` that
//! always resets `status` to `"healthy"` and refreshes `last_heartbeat` --
//! there is no separate heartbeat endpoint.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{now_iso, Node};

pub struct NodeStore {
    pool: SqlitePool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    Updated,
}

impl NodeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS nodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                base_url TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'healthy',
                last_heartbeat TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("creating nodes table")?;
        Ok(())
    }

    pub async fn register(&self, name: &str, base_url: &str) -> Result<RegisterOutcome> {
        let now = now_iso();
        let existing = self.get(name).await?;

        sqlx::query(
            "INSERT INTO nodes (name, base_url, status, last_heartbeat)
             VALUES (?, ?, 'healthy', ?)
             ON CONFLICT(name) DO UPDATE SET
                base_url = excluded.base_url,
                status = 'healthy',
                last_heartbeat = excluded.last_heartbeat",
        )
        .bind(name)
        .bind(base_url)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("registering node")?;

        Ok(if existing.is_some() {
            RegisterOutcome::Updated
        } else {
            RegisterOutcome::Registered
        })
    }

    pub async fn get(&self, name: &str) -> Result<Option<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT name, base_url, status, last_heartbeat FROM nodes WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("fetching node")
    }

    pub async fn list(&self) -> Result<Vec<Node>> {
        sqlx::query_as::<_, Node>("SELECT name, base_url, status, last_heartbeat FROM nodes ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("listing nodes")
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM nodes")
            .fetch_one(&self.pool)
            .await
            .context("counting nodes")?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> NodeStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let store = NodeStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn first_registration_inserts() {
        let store = store().await;
        let outcome = store.register("alpha", "http://alpha:8001").await.unwrap();
        assert_eq!(outcome, RegisterOutcome::Registered);
        let node = store.get("alpha").await.unwrap().unwrap();
        assert_eq!(node.base_url, "http://alpha:8001");
        assert_eq!(node.status, "healthy");
    }

    #[tokio::test]
    async fn re_registration_updates_base_url_and_refreshes_heartbeat() {
        let store = store().await;
        store.register("alpha", "http://alpha:8001").await.unwrap();
        let first = store.get("alpha").await.unwrap().unwrap();

        let outcome = store.register("alpha", "http://alpha:9001").await.unwrap();
        assert_eq!(outcome, RegisterOutcome::Updated);
        let second = store.get("alpha").await.unwrap().unwrap();
        assert_eq!(second.base_url, "http://alpha:9001");
        assert!(second.last_heartbeat >= first.last_heartbeat);
    }

    #[tokio::test]
    async fn list_returns_all_registered_nodes() {
        let store = store().await;
        store.register("alpha", "http://alpha:8001").await.unwrap();
        store.register("beta", "http://beta:8001").await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
