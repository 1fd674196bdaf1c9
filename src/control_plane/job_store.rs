//! Durable migration job queue. The `queued -> running` claim is a single
//! `UPDATE ... WHERE id = ? AND status = ?`; the affected-row count is the
//! atomicity witness a second claimant's identical statement would see as
//! zero rows.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{now_iso, Job};

pub struct JobStore {
    pool: SqlitePool,
}

impl JobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                src_node TEXT NOT NULL,
                dst_node TEXT NOT NULL,
                object_id TEXT NOT NULL,
                status TEXT NOT NULL,
                retries INTEGER NOT NULL DEFAULT 0,
                last_error TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("creating jobs table")?;
        Ok(())
    }

    pub async fn enqueue_migrate(&self, src_node: &str, dst_node: &str, object_id: &str) -> Result<i64> {
        let now = now_iso();
        let result = sqlx::query(
            "INSERT INTO jobs (kind, src_node, dst_node, object_id, status, retries, last_error, created_at, updated_at)
             VALUES ('migrate', ?, ?, ?, 'queued', 0, '', ?, ?)",
        )
        .bind(src_node)
        .bind(dst_node)
        .bind(object_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("enqueuing job")?;
        Ok(result.last_insert_rowid())
    }

    pub async fn peek_oldest_queued(&self, kind: &str) -> Result<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT id, kind, src_node, dst_node, object_id, status, retries, last_error, created_at, updated_at
             FROM jobs WHERE status = 'queued' AND kind = ? ORDER BY id ASC LIMIT 1",
        )
        .bind(kind)
        .fetch_optional(&self.pool)
        .await
        .context("peeking oldest queued job")
    }

    /// Atomic `from -> to` transition. Returns `false` if another claimant
    /// already moved the row out of `from`.
    pub async fn transition(&self, id: i64, from: &str, to: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE jobs SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(now_iso())
            .bind(id)
            .bind(from)
            .execute(&self.pool)
            .await
            .context("transitioning job status")?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_succeeded(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE jobs SET status = 'succeeded', last_error = '', updated_at = ? WHERE id = ?")
            .bind(now_iso())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("marking job succeeded")?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: i64, err: &str) -> Result<()> {
        sqlx::query("UPDATE jobs SET status = 'failed', last_error = ?, updated_at = ? WHERE id = ?")
            .bind(err)
            .bind(now_iso())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("marking job failed")?;
        Ok(())
    }

    pub async fn bump_retry(&self, id: i64, err: &str) -> Result<()> {
        sqlx::query("UPDATE jobs SET retries = retries + 1, last_error = ?, updated_at = ? WHERE id = ?")
            .bind(err)
            .bind(now_iso())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("bumping job retry count")?;
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT id, kind, src_node, dst_node, object_id, status, retries, last_error, created_at, updated_at
             FROM jobs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching job")
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT id, kind, src_node, dst_node, object_id, status, retries, last_error, created_at, updated_at
             FROM jobs ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("listing jobs")
    }

    pub async fn count_all(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .context("counting jobs")?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .context("counting jobs by status")?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> JobStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let store = JobStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn enqueue_then_peek_returns_the_job() {
        let store = store().await;
        let id = store.enqueue_migrate("src", "dst", "obj").await.unwrap();
        let job = store.peek_oldest_queued("migrate").await.unwrap().unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.status, Job::QUEUED);
    }

    #[tokio::test]
    async fn transition_succeeds_exactly_once() {
        let store = store().await;
        let id = store.enqueue_migrate("src", "dst", "obj").await.unwrap();
        assert!(store.transition(id, Job::QUEUED, Job::RUNNING).await.unwrap());
        // a second claimant racing on the same from-state loses
        assert!(!store.transition(id, Job::QUEUED, Job::RUNNING).await.unwrap());
    }

    #[tokio::test]
    async fn mark_succeeded_clears_last_error() {
        let store = store().await;
        let id = store.enqueue_migrate("src", "dst", "obj").await.unwrap();
        store.bump_retry(id, "transient").await.unwrap();
        store.mark_succeeded(id).await.unwrap();
        let job = store.get(id).await.unwrap().unwrap();
        assert_eq!(job.status, Job::SUCCEEDED);
        assert_eq!(job.last_error, "");
        assert_eq!(job.retries, 1);
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let store = store().await;
        store.enqueue_migrate("src", "dst", "a").await.unwrap();
        store.enqueue_migrate("src", "dst", "b").await.unwrap();
        let jobs = store.list(10).await.unwrap();
        assert_eq!(jobs[0].object_id, "b");
        assert_eq!(jobs[1].object_id, "a");
    }
}
