use super::set_settings::SetSettingsUseCase;
use crate::shared::usecase::Subscriber;
use reward_scheduler_domain::ScheduleSettings;
use reward_scheduler_infra::Context;
use tracing::warn;

pub struct NudgeGenerationOnSettingsChanged;

#[async_trait::async_trait(?Send)]
impl Subscriber<SetSettingsUseCase> for NudgeGenerationOnSettingsChanged {
    async fn notify(&self, e: &ScheduleSettings, ctx: &Context) {
        if let Err(err) = ctx.reminders.request_generation(&e.profile_id).await {
            warn!(
                "Failed to request schedule generation for profile {}: {:?}",
                e.profile_id, err
            );
        }
    }
}
