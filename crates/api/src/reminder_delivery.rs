use crate::shared::usecase::UseCase;
use reward_scheduler_domain::{ACTIVE_UPCOMING_STATUSES, ID};
use reward_scheduler_infra::{Context, IdempotencyKey};
use tracing::{info, warn};

const IDEMPOTENCY_KIND: &str = "reminder-email";

/// One delivery pass over the due reminder jobs.
///
/// Cancellation upstream is best-effort, so every job is re-validated
/// here before it counts: the event must still exist and still be in an
/// upcoming status. A persisted idempotency key per (event, reminder
/// instant) then caps the system at one effective send even when the
/// same job is observed twice.
#[derive(Debug)]
pub struct DeliverRemindersUseCase;

#[derive(Debug, Default, PartialEq)]
pub struct DeliveryReport {
    pub sent_event_ids: Vec<ID>,
    pub skipped_jobs: usize,
}

#[derive(Debug)]
pub enum UseCaseErrors {}

#[async_trait::async_trait(?Send)]
impl UseCase for DeliverRemindersUseCase {
    type Response = DeliveryReport;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_utc_now();
        let limit = ctx.config.reminder_cancel_scan_limit;

        let due = match ctx.reminders.due_reminders(now, limit).await {
            Ok(due) => due,
            Err(e) => {
                warn!("Failed to fetch due reminder jobs: {:?}", e);
                return Ok(DeliveryReport::default());
            }
        };

        let mut report = DeliveryReport::default();
        for (job, payload) in due {
            let key = format!("{}:{}", payload.event_id, payload.reminder_at.to_rfc3339());

            let already_sent = ctx.repos.idempotency_keys.exists(&key).await;
            let eligible = match ctx.repos.events.find(&payload.event_id).await {
                Some(event) => ACTIVE_UPCOMING_STATUSES.contains(&event.status),
                None => false,
            };

            if already_sent || !eligible {
                report.skipped_jobs += 1;
            } else {
                // Transport is out of scope here, emitting the reminder is
                // a structured log line the mail worker tails
                info!(
                    "Sending reminder for event {} due at {}",
                    payload.event_id, payload.reminder_at
                );
                let record = IdempotencyKey {
                    key,
                    kind: IDEMPOTENCY_KIND.into(),
                    created: now,
                };
                if let Err(e) = ctx.repos.idempotency_keys.insert(&record).await {
                    warn!("Failed to record reminder idempotency key: {:?}", e);
                }
                report.sent_event_ids.push(payload.event_id.clone());
            }

            if let Err(e) = ctx.reminders.complete_reminder_job(&job).await {
                warn!("Failed to remove handled reminder job {}: {:?}", job.job_id, e);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_helpers::{setup, TestContext};
    use crate::shared::usecase::execute;
    use chrono::{Duration, Utc};
    use reward_scheduler_domain::RewardEvent;

    async fn due_reminder_for(ctx: &Context, event: &RewardEvent) {
        // Lead larger than the time to the event puts the reminder instant
        // in the past, making the job due immediately
        ctx.reminders
            .enqueue(&event.id, event.scheduled_at, 24, Utc::now())
            .await
            .unwrap();
    }

    #[actix_web::main]
    #[test]
    async fn sends_once_per_reminder_instant() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;
        let now = Utc::now();

        let event = RewardEvent::new(
            profile.id.clone(),
            config.id.clone(),
            now + Duration::hours(2),
            false,
            None,
            now,
        );
        ctx.repos.events.insert(&event).await.unwrap();
        due_reminder_for(&ctx, &event).await;

        let report = execute(DeliverRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent_event_ids, vec![event.id.clone()]);
        assert_eq!(report.skipped_jobs, 0);

        // The same job re-enqueued is deduped by the persisted key
        due_reminder_for(&ctx, &event).await;
        let report = execute(DeliverRemindersUseCase, &ctx).await.unwrap();
        assert!(report.sent_event_ids.is_empty());
        assert_eq!(report.skipped_jobs, 1);
    }

    #[actix_web::main]
    #[test]
    async fn revalidates_event_state_before_sending() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;
        let now = Utc::now();

        let mut event = RewardEvent::new(
            profile.id.clone(),
            config.id.clone(),
            now + Duration::hours(2),
            false,
            None,
            now,
        );
        ctx.repos.events.insert(&event).await.unwrap();
        due_reminder_for(&ctx, &event).await;

        // Completed after the job was enqueued but before it fired
        event.complete(reward_scheduler_domain::SentimentLevel::Well, None, now);
        ctx.repos.events.save(&event).await.unwrap();

        let report = execute(DeliverRemindersUseCase, &ctx).await.unwrap();
        assert!(report.sent_event_ids.is_empty());
        assert_eq!(report.skipped_jobs, 1);

        // Deleted events are skipped the same way
        let orphan = RewardEvent::new(
            profile.id.clone(),
            config.id.clone(),
            now + Duration::hours(3),
            false,
            None,
            now,
        );
        due_reminder_for(&ctx, &orphan).await;
        let report = execute(DeliverRemindersUseCase, &ctx).await.unwrap();
        assert!(report.sent_event_ids.is_empty());
        assert_eq!(report.skipped_jobs, 1);
    }
}
