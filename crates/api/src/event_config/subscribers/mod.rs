use super::{
    create_event_config::CreateEventConfigUseCase,
    delete_event_config::{DeleteEventConfigUseCase, DeletedEventConfigResponse},
    update_event_config::UpdateEventConfigUseCase,
};
use crate::shared::usecase::Subscriber;
use reward_scheduler_domain::{EventConfig, ID};
use reward_scheduler_infra::Context;
use tracing::warn;

async fn nudge_generation(profile_id: &ID, ctx: &Context) {
    if let Err(e) = ctx.reminders.request_generation(profile_id).await {
        warn!(
            "Failed to request schedule generation for profile {}: {:?}",
            profile_id, e
        );
    }
}

pub struct NudgeGenerationOnConfigCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateEventConfigUseCase> for NudgeGenerationOnConfigCreated {
    async fn notify(&self, e: &EventConfig, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

pub struct NudgeGenerationOnConfigUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateEventConfigUseCase> for NudgeGenerationOnConfigUpdated {
    async fn notify(&self, e: &EventConfig, ctx: &Context) {
        nudge_generation(&e.profile_id, ctx).await;
    }
}

pub struct CancelRemindersOnConfigDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteEventConfigUseCase> for CancelRemindersOnConfigDeleted {
    async fn notify(&self, e: &DeletedEventConfigResponse, ctx: &Context) {
        for event_id in &e.deleted_event_ids {
            if let Err(err) = ctx.reminders.cancel(event_id).await {
                warn!(
                    "Failed to cancel reminders for cascade-deleted event {}: {:?}",
                    event_id, err
                );
            }
        }
    }
}

pub struct NudgeGenerationOnConfigDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteEventConfigUseCase> for NudgeGenerationOnConfigDeleted {
    async fn notify(&self, e: &DeletedEventConfigResponse, ctx: &Context) {
        nudge_generation(&e.config.profile_id, ctx).await;
    }
}
