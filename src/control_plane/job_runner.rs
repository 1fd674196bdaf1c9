//! Single-writer job runner: poll, atomically claim, resolve nodes,
//! migrate, record the terminal status, sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use tokio::sync::Notify;

use super::job_store::JobStore;
use super::migration::MigrationEngine;
use super::models::{Job, Node};
use super::node_store::NodeStore;

pub struct JobRunner {
    jobs: Arc<JobStore>,
    nodes: Arc<NodeStore>,
    migration: MigrationEngine,
    poll_interval: Duration,
    stop: Arc<Notify>,
    stopped: Arc<AtomicBool>,
}

/// A cloneable reference used to signal the runner to stop without owning it.
#[derive(Clone)]
pub struct JobRunnerHandle {
    stop: Arc<Notify>,
    stopped: Arc<AtomicBool>,
}

impl JobRunnerHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.stop.notify_waiters();
    }
}

impl JobRunner {
    pub fn new(
        jobs: Arc<JobStore>,
        nodes: Arc<NodeStore>,
        migration: MigrationEngine,
        poll_interval: Duration,
    ) -> Self {
        Self {
            jobs,
            nodes,
            migration,
            poll_interval,
            stop: Arc::new(Notify::new()),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> JobRunnerHandle {
        JobRunnerHandle {
            stop: self.stop.clone(),
            stopped: self.stopped.clone(),
        }
    }

    /// Polls until stopped. A stop signal interrupts the sleep between
    /// iterations but never an in-flight migration -- the loop always
    /// finishes `run_once` before checking `stopped` again.
    pub async fn run_forever(&self) {
        while !self.stopped.load(Ordering::SeqCst) {
            if let Err(e) = self.run_once().await {
                error!("job runner iteration failed: {e:#}");
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.stop.notified() => {}
            }
        }
        info!("job runner stopped");
    }

    async fn run_once(&self) -> Result<()> {
        let Some(job) = self.jobs.peek_oldest_queued("migrate").await? else {
            return Ok(());
        };

        if !self.jobs.transition(job.id, Job::QUEUED, Job::RUNNING).await? {
            // another claimant (or a test) already moved this job; abandon.
            return Ok(());
        }

        self.execute(&job).await
    }

    async fn execute(&self, job: &Job) -> Result<()> {
        let src = match self.resolve_node(&job.src_node, job.id).await? {
            Some(n) => n,
            None => return Ok(()),
        };
        let dst = match self.resolve_node(&job.dst_node, job.id).await? {
            Some(n) => n,
            None => return Ok(()),
        };

        match self.migration.migrate(&src.base_url, &dst.base_url, &job.object_id).await {
            Ok(_report) => self.jobs.mark_succeeded(job.id).await?,
            Err(e) => self.jobs.mark_failed(job.id, &format!("{e:#}")).await?,
        }
        Ok(())
    }

    /// Resolves `name` to a registered node, or fails the job directly (no
    /// HTTP calls made) when the name is unknown.
    async fn resolve_node(&self, name: &str, job_id: i64) -> Result<Option<Node>> {
        match self.nodes.get(name).await? {
            Some(node) => Ok(Some(node)),
            None => {
                self.jobs
                    .mark_failed(job_id, &format!("unknown node {name}"))
                    .await?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpClient;
    use crate::rate_limit::RateLimiter;
    use sqlx::SqlitePool;

    async fn runner() -> (JobRunner, Arc<JobStore>, Arc<NodeStore>) {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let jobs = Arc::new(JobStore::new(pool.clone()));
        jobs.migrate().await.unwrap();
        let nodes = Arc::new(NodeStore::new(pool));
        nodes.migrate().await.unwrap();

        let http = HttpClient::new(Duration::from_secs(5));
        let limiter = Arc::new(RateLimiter::new(20, 20));
        let migration = MigrationEngine::new(http, limiter, 4);

        let runner = JobRunner::new(jobs.clone(), nodes.clone(), migration, Duration::from_millis(10));
        (runner, jobs, nodes)
    }

    #[tokio::test]
    async fn unknown_destination_fails_without_http_calls() {
        let (runner, jobs, nodes) = runner().await;
        nodes.register("src", "http://src.invalid").await.unwrap();
        let id = jobs.enqueue_migrate("src", "dst", "obj").await.unwrap();

        runner.run_once().await.unwrap();

        let job = jobs.get(id).await.unwrap().unwrap();
        assert_eq!(job.status, Job::FAILED);
        assert!(job.last_error.contains("dst"));
    }

    #[tokio::test]
    async fn unknown_source_fails_before_resolving_destination() {
        let (runner, jobs, nodes) = runner().await;
        nodes.register("dst", "http://dst.invalid").await.unwrap();
        let id = jobs.enqueue_migrate("src", "dst", "obj").await.unwrap();

        runner.run_once().await.unwrap();

        let job = jobs.get(id).await.unwrap().unwrap();
        assert_eq!(job.status, Job::FAILED);
        assert!(job.last_error.contains("src"));
    }

    #[tokio::test]
    async fn empty_queue_is_a_no_op() {
        let (runner, _jobs, _nodes) = runner().await;
        runner.run_once().await.unwrap();
    }

    #[tokio::test]
    async fn stop_handle_breaks_run_forever() {
        let (runner, _jobs, _nodes) = runner().await;
        let handle = runner.handle();
        handle.stop();
        // run_forever must return promptly since `stopped` is already set.
        tokio::time::timeout(Duration::from_secs(1), runner.run_forever())
            .await
            .expect("run_forever did not stop promptly");
    }
}
