use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Lifecycle states a delayed job can be queried by, mirroring the
/// broker's own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Delayed,
    Waiting,
    Active,
    Failed,
}

#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub queue: String,
    pub job_id: String,
    pub payload: serde_json::Value,
    pub run_at: DateTime<Utc>,
    pub state: JobState,
}

/// Thin contract over the external delayed-job broker. Jobs are
/// deduplicated by (queue, job id): re-adding an existing job id is a
/// no-op, which is what makes deterministic job keys idempotent.
#[async_trait::async_trait]
pub trait IJobBroker: Send + Sync {
    async fn add(
        &self,
        queue: &str,
        job_id: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) -> anyhow::Result<()>;
    async fn get_jobs(
        &self,
        queue: &str,
        states: &[JobState],
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<QueuedJob>>;
    /// Removes a job by id. Returns false when there was nothing to
    /// remove, which callers must tolerate.
    async fn remove(&self, queue: &str, job_id: &str) -> anyhow::Result<bool>;
    async fn close(&self) -> anyhow::Result<()>;
}

pub struct InMemoryJobBroker {
    jobs: Mutex<Vec<QueuedJob>>,
}

impl InMemoryJobBroker {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryJobBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IJobBroker for InMemoryJobBroker {
    async fn add(
        &self,
        queue: &str,
        job_id: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.iter().any(|j| j.queue == queue && j.job_id == job_id) {
            return Ok(());
        }
        let state = if delay > Duration::zero() {
            JobState::Delayed
        } else {
            JobState::Waiting
        };
        jobs.push(QueuedJob {
            queue: queue.to_string(),
            job_id: job_id.to_string(),
            payload,
            run_at: Utc::now() + delay,
            state,
        });
        Ok(())
    }

    async fn get_jobs(
        &self,
        queue: &str,
        states: &[JobState],
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<QueuedJob>> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs
            .iter()
            .filter(|j| j.queue == queue && states.contains(&j.state))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn remove(&self, queue: &str, job_id: &str) -> anyhow::Result<bool> {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|j| !(j.queue == queue && j.job_id == job_id));
        Ok(jobs.len() < before)
    }

    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
