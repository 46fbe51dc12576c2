use crate::services::broker::{IJobBroker, JobState, QueuedJob};
use chrono::{DateTime, Duration, Utc};
use reward_scheduler_domain::ID;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const REMINDER_QUEUE: &str = "email-reminders";
pub const GENERATION_QUEUE: &str = "schedule-generation";

const CANCEL_SCAN_STATES: [JobState; 4] = [
    JobState::Delayed,
    JobState::Waiting,
    JobState::Active,
    JobState::Failed,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderJobPayload {
    pub event_id: ID,
    pub reminder_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJobPayload {
    pub profile_id: Option<ID>,
}

/// Coordinates the single delayed reminder job each event may have
/// pending, and the deduplicated per-profile generation triggers.
///
/// Explicitly constructed and injected (no lazy module-level queue
/// handles) so it can be closed cleanly and substituted in tests. All
/// operations are best-effort from the caller's perspective: a mutation
/// must never fail because the broker was unreachable.
pub struct ReminderCoordinator {
    broker: Arc<dyn IJobBroker>,
    cancel_scan_limit: usize,
}

impl ReminderCoordinator {
    pub fn new(broker: Arc<dyn IJobBroker>, cancel_scan_limit: usize) -> Self {
        Self {
            broker,
            cancel_scan_limit,
        }
    }

    /// Deterministic job key. Re-enqueueing the same (event, reminder
    /// instant) pair hits the same key and the broker dedupes it.
    pub fn reminder_job_id(event_id: &ID, reminder_at: DateTime<Utc>) -> String {
        format!("{}:{}", event_id, reminder_at.to_rfc3339())
    }

    /// Schedules the reminder for an event. No-op when `scheduled_at` is
    /// not strictly in the future.
    pub async fn enqueue(
        &self,
        event_id: &ID,
        scheduled_at: DateTime<Utc>,
        lead_hours: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        if scheduled_at <= now {
            return Ok(());
        }

        let reminder_at = scheduled_at - Duration::hours(lead_hours);
        let delay = (reminder_at - now).max(Duration::zero());
        let payload = ReminderJobPayload {
            event_id: event_id.clone(),
            reminder_at,
        };

        self.broker
            .add(
                REMINDER_QUEUE,
                &Self::reminder_job_id(event_id, reminder_at),
                serde_json::to_value(&payload)?,
                delay,
            )
            .await
    }

    /// Removes every pending reminder job for the event. Scans a bounded
    /// window of jobs and tolerates individual removal failures: a job
    /// that slips through fires into the send consumer, which re-checks
    /// eligibility before sending.
    pub async fn cancel(&self, event_id: &ID) -> anyhow::Result<()> {
        let jobs = self
            .broker
            .get_jobs(REMINDER_QUEUE, &CANCEL_SCAN_STATES, 0, self.cancel_scan_limit)
            .await?;

        for job in jobs {
            let matches = serde_json::from_value::<ReminderJobPayload>(job.payload.clone())
                .map(|payload| payload.event_id == *event_id)
                .unwrap_or(false);
            if !matches {
                continue;
            }
            if let Err(e) = self.broker.remove(REMINDER_QUEUE, &job.job_id).await {
                warn!(
                    "Failed to remove reminder job {} for event {}: {:?}",
                    job.job_id, event_id, e
                );
            }
        }
        Ok(())
    }

    /// Cancel-then-enqueue. The only safe way to move a reminder: an
    /// enqueue without the preceding cancel can leave two deliverable
    /// reminders across a reschedule.
    pub async fn replace(
        &self,
        event_id: &ID,
        scheduled_at: DateTime<Utc>,
        lead_hours: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.cancel(event_id).await?;
        self.enqueue(event_id, scheduled_at, lead_hours, now).await
    }

    /// Nudges the background generator to re-examine one profile.
    /// Deduplicated by job key, so a burst of structural changes within
    /// one processing window collapses to a single pass.
    pub async fn request_generation(&self, profile_id: &ID) -> anyhow::Result<()> {
        let payload = GenerationJobPayload {
            profile_id: Some(profile_id.clone()),
        };
        self.broker
            .add(
                GENERATION_QUEUE,
                &format!("profile-refresh:{}", profile_id),
                serde_json::to_value(&payload)?,
                Duration::zero(),
            )
            .await
    }

    /// Reminder jobs whose delay has elapsed, for the delivery pass.
    pub async fn due_reminders(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> anyhow::Result<Vec<(QueuedJob, ReminderJobPayload)>> {
        let jobs = self
            .broker
            .get_jobs(
                REMINDER_QUEUE,
                &[JobState::Delayed, JobState::Waiting],
                0,
                limit,
            )
            .await?;

        Ok(jobs
            .into_iter()
            .filter(|job| job.run_at <= now)
            .filter_map(|job| {
                serde_json::from_value::<ReminderJobPayload>(job.payload.clone())
                    .ok()
                    .map(|payload| (job, payload))
            })
            .collect())
    }

    /// Drains pending generation triggers, returning the deduplicated
    /// profile ids to re-examine.
    pub async fn take_generation_triggers(&self) -> anyhow::Result<Vec<GenerationJobPayload>> {
        let jobs = self
            .broker
            .get_jobs(
                GENERATION_QUEUE,
                &[JobState::Delayed, JobState::Waiting],
                0,
                self.cancel_scan_limit,
            )
            .await?;

        let mut triggers = Vec::with_capacity(jobs.len());
        for job in jobs {
            if let Err(e) = self.broker.remove(GENERATION_QUEUE, &job.job_id).await {
                warn!("Failed to remove generation trigger {}: {:?}", job.job_id, e);
                continue;
            }
            if let Ok(payload) = serde_json::from_value::<GenerationJobPayload>(job.payload) {
                triggers.push(payload);
            }
        }
        Ok(triggers)
    }

    /// Marks a reminder job as handled by removing it from the broker.
    pub async fn complete_reminder_job(&self, job: &QueuedJob) -> anyhow::Result<()> {
        self.broker.remove(REMINDER_QUEUE, &job.job_id).await?;
        Ok(())
    }

    pub async fn close(&self) -> anyhow::Result<()> {
        self.broker.close().await
    }

    pub fn broker(&self) -> &Arc<dyn IJobBroker> {
        &self.broker
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::services::broker::InMemoryJobBroker;

    fn coordinator() -> ReminderCoordinator {
        ReminderCoordinator::new(Arc::new(InMemoryJobBroker::new()), 1000)
    }

    #[tokio::test]
    async fn enqueue_twice_yields_one_job() {
        let coordinator = coordinator();
        let event_id = ID::new();
        let now = Utc::now();
        let scheduled_at = now + Duration::hours(48);

        coordinator
            .enqueue(&event_id, scheduled_at, 24, now)
            .await
            .unwrap();
        coordinator
            .enqueue(&event_id, scheduled_at, 24, now)
            .await
            .unwrap();

        let jobs = coordinator
            .broker()
            .get_jobs(REMINDER_QUEUE, &CANCEL_SCAN_STATES, 0, 10)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
    }

    #[tokio::test]
    async fn enqueue_skips_past_schedules() {
        let coordinator = coordinator();
        let now = Utc::now();

        coordinator
            .enqueue(&ID::new(), now - Duration::hours(1), 24, now)
            .await
            .unwrap();

        let jobs = coordinator
            .broker()
            .get_jobs(REMINDER_QUEUE, &CANCEL_SCAN_STATES, 0, 10)
            .await
            .unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn replace_moves_the_reminder() {
        let coordinator = coordinator();
        let event_id = ID::new();
        let other_event = ID::new();
        let now = Utc::now();

        coordinator
            .enqueue(&event_id, now + Duration::hours(48), 24, now)
            .await
            .unwrap();
        coordinator
            .enqueue(&other_event, now + Duration::hours(30), 24, now)
            .await
            .unwrap();

        coordinator
            .replace(&event_id, now + Duration::hours(96), 24, now)
            .await
            .unwrap();

        let jobs = coordinator
            .broker()
            .get_jobs(REMINDER_QUEUE, &CANCEL_SCAN_STATES, 0, 10)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 2);

        let expected_reminder_at = now + Duration::hours(96) - Duration::hours(24);
        assert!(jobs.iter().any(|job| job.job_id
            == ReminderCoordinator::reminder_job_id(&event_id, expected_reminder_at)));
    }

    #[tokio::test]
    async fn cancel_tolerates_no_jobs() {
        let coordinator = coordinator();
        coordinator.cancel(&ID::new()).await.unwrap();
    }

    #[tokio::test]
    async fn generation_triggers_collapse_per_profile() {
        let coordinator = coordinator();
        let profile_id = ID::new();

        coordinator.request_generation(&profile_id).await.unwrap();
        coordinator.request_generation(&profile_id).await.unwrap();

        let triggers = coordinator.take_generation_triggers().await.unwrap();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].profile_id, Some(profile_id.clone()));

        // Drained, and a later trigger is accepted again.
        assert!(coordinator.take_generation_triggers().await.unwrap().is_empty());
        coordinator.request_generation(&profile_id).await.unwrap();
        assert_eq!(coordinator.take_generation_triggers().await.unwrap().len(), 1);
    }
}
