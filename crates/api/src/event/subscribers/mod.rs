use super::{
    apply_missed_option::ApplyMissedOptionUseCase,
    complete_event::CompleteEventUseCase,
    create_event::CreateEventUseCase,
    delete_event::DeleteEventUseCase,
    miss_event::{MissEventUseCase, MissedEventResponse},
    reschedule_event::RescheduleEventUseCase,
    update_event::UpdateEventUseCase,
};
use crate::shared::usecase::Subscriber;
use reward_scheduler_domain::{RewardEvent, ID};
use reward_scheduler_infra::Context;
use tracing::warn;

const DEFAULT_REMINDER_LEAD_HOURS: i64 = 24;

async fn reminder_lead_hours(profile_id: &ID, ctx: &Context) -> i64 {
    ctx.repos
        .schedule_settings
        .find_by_profile(profile_id)
        .await
        .map(|settings| settings.reminder_lead_hours)
        .unwrap_or(DEFAULT_REMINDER_LEAD_HOURS)
}

/// Brings the broker in line with the event: active upcoming events get
/// their single reminder job (re)placed, everything else gets its jobs
/// cancelled. Failures are logged and swallowed, the mutation that
/// triggered this already committed.
async fn sync_reminder(event: &RewardEvent, ctx: &Context) {
    let now = ctx.sys.get_utc_now();
    let res = if event.is_active_upcoming(now) {
        let lead_hours = reminder_lead_hours(&event.profile_id, ctx).await;
        ctx.reminders
            .replace(&event.id, event.scheduled_at, lead_hours, now)
            .await
    } else {
        ctx.reminders.cancel(&event.id).await
    };
    if let Err(e) = res {
        warn!("Failed to sync reminder for event {}: {:?}", event.id, e);
    }
}

/// Fire-and-forget nudge for the background generator to re-examine the
/// profile after a structural change.
async fn nudge_generation(profile_id: &ID, ctx: &Context) {
    if let Err(e) = ctx.reminders.request_generation(profile_id).await {
        warn!(
            "Failed to request schedule generation for profile {}: {:?}",
            profile_id, e
        );
    }
}

pub struct SyncReminderOnEventCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateEventUseCase> for SyncReminderOnEventCreated {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        sync_reminder(e, ctx).await;
    }
}

pub struct NudgeGenerationOnEventCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateEventUseCase> for NudgeGenerationOnEventCreated {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

pub struct SyncReminderOnEventUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateEventUseCase> for SyncReminderOnEventUpdated {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        sync_reminder(e, ctx).await;
    }
}

pub struct NudgeGenerationOnEventUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateEventUseCase> for NudgeGenerationOnEventUpdated {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

pub struct CancelReminderOnEventDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteEventUseCase> for CancelReminderOnEventDeleted {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        if let Err(err) = ctx.reminders.cancel(&e.id).await {
            warn!("Failed to cancel reminders for deleted event {}: {:?}", e.id, err);
        }
    }
}

pub struct NudgeGenerationOnEventDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteEventUseCase> for NudgeGenerationOnEventDeleted {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

pub struct CancelReminderOnEventCompleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<CompleteEventUseCase> for CancelReminderOnEventCompleted {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        sync_reminder(e, ctx).await;
    }
}

pub struct NudgeGenerationOnEventCompleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<CompleteEventUseCase> for NudgeGenerationOnEventCompleted {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

pub struct CancelReminderOnEventMissed;

#[async_trait::async_trait(?Send)]
impl Subscriber<MissEventUseCase> for CancelReminderOnEventMissed {
    async fn notify(&self, e: &MissedEventResponse, ctx: &Context) {
        sync_reminder(&e.event, ctx).await;
    }
}

pub struct NudgeGenerationOnEventMissed;

#[async_trait::async_trait(?Send)]
impl Subscriber<MissEventUseCase> for NudgeGenerationOnEventMissed {
    async fn notify(&self, e: &MissedEventResponse, ctx: &Context) {
        nudge_generation(&e.event.profile_id, ctx).await;
    }
}

pub struct SyncReminderOnEventRescheduled;

#[async_trait::async_trait(?Send)]
impl Subscriber<RescheduleEventUseCase> for SyncReminderOnEventRescheduled {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        sync_reminder(e, ctx).await;
    }
}

pub struct NudgeGenerationOnEventRescheduled;

#[async_trait::async_trait(?Send)]
impl Subscriber<RescheduleEventUseCase> for NudgeGenerationOnEventRescheduled {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

pub struct SyncReminderOnOptionApplied;

#[async_trait::async_trait(?Send)]
impl Subscriber<ApplyMissedOptionUseCase> for SyncReminderOnOptionApplied {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        sync_reminder(e, ctx).await;
    }
}

pub struct NudgeGenerationOnOptionApplied;

#[async_trait::async_trait(?Send)]
impl Subscriber<ApplyMissedOptionUseCase> for NudgeGenerationOnOptionApplied {
    async fn notify(&self, e: &RewardEvent, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::create_event::CreateEventUseCase;
    use crate::event::reschedule_event::RescheduleEventUseCase;
    use crate::event::test_helpers::{setup, TestContext};
    use crate::shared::usecase::execute;
    use reward_scheduler_domain::SentimentLevel;
    use reward_scheduler_infra::{JobState, REMINDER_QUEUE};

    async fn pending_reminder_jobs(ctx: &Context) -> usize {
        ctx.reminders
            .broker()
            .get_jobs(REMINDER_QUEUE, &[JobState::Delayed, JobState::Waiting], 0, 10)
            .await
            .unwrap()
            .len()
    }

    #[actix_web::main]
    #[test]
    async fn reminder_follows_the_event_across_a_reschedule() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let create = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-18".into(),
            time: Some("18:00".into()),
            notes: None,
        };
        let event = execute(create, &ctx).await.unwrap();
        assert_eq!(pending_reminder_jobs(&ctx).await, 1);

        let reschedule = RescheduleEventUseCase {
            event_id: event.id.clone(),
            date: "2030-07-01".into(),
            time: Some("18:00".into()),
            reason: Some("moved".into()),
            actor: "user".into(),
        };
        let rescheduled = execute(reschedule, &ctx).await.unwrap();

        let jobs = ctx
            .reminders
            .broker()
            .get_jobs(REMINDER_QUEUE, &[JobState::Delayed, JobState::Waiting], 0, 10)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        let expected_reminder_at = rescheduled.scheduled_at - chrono::Duration::hours(24);
        assert_eq!(
            jobs[0].job_id,
            reward_scheduler_infra::ReminderCoordinator::reminder_job_id(
                &rescheduled.id,
                expected_reminder_at
            )
        );
    }

    #[actix_web::main]
    #[test]
    async fn completing_an_event_cancels_its_reminder_for_good() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let create = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-18".into(),
            time: Some("18:00".into()),
            notes: None,
        };
        let event = execute(create, &ctx).await.unwrap();
        assert_eq!(pending_reminder_jobs(&ctx).await, 1);

        let complete = CompleteEventUseCase {
            event_id: event.id.clone(),
            sentiment_level: SentimentLevel::Well,
            notes: None,
        };
        execute(complete, &ctx).await.unwrap();
        assert_eq!(pending_reminder_jobs(&ctx).await, 0);

        // A later notes-only patch on the completed event must not bring
        // the reminder back
        let update = UpdateEventUseCase {
            event_id: event.id.clone(),
            date: None,
            time: None,
            notes: Some("she loved the tulips".into()),
            reason: None,
            actor: "user".into(),
        };
        execute(update, &ctx).await.unwrap();
        assert_eq!(pending_reminder_jobs(&ctx).await, 0);
    }
}
