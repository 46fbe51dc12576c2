use crate::reminder_delivery::DeliverRemindersUseCase;
use crate::schedule_generation::GenerateSchedulesUseCase;
use crate::shared::usecase::execute;
use reward_scheduler_infra::Context;
use std::time::Duration;

const TRIGGER_DRAIN_INTERVAL_SECS: u64 = 30;

/// Daily full generation sweep over all active profiles.
pub fn start_schedule_generation_job(ctx: Context) {
    actix_web::rt::spawn(async move {
        let mut interval =
            actix_web::rt::time::interval(Duration::from_secs(ctx.config.generation_interval_secs));
        loop {
            interval.tick().await;

            let usecase = GenerateSchedulesUseCase { profile_id: None };
            let _ = execute(usecase, &ctx).await;
        }
    });
}

/// Drains the deduplicated per-profile generation triggers that
/// structural changes enqueue between full sweeps.
pub fn start_generation_trigger_job(ctx: Context) {
    actix_web::rt::spawn(async move {
        let mut interval =
            actix_web::rt::time::interval(Duration::from_secs(TRIGGER_DRAIN_INTERVAL_SECS));
        loop {
            interval.tick().await;

            let triggers = match ctx.reminders.take_generation_triggers().await {
                Ok(triggers) => triggers,
                Err(e) => {
                    tracing::warn!("Failed to drain generation triggers: {:?}", e);
                    continue;
                }
            };
            for trigger in triggers {
                let usecase = GenerateSchedulesUseCase {
                    profile_id: trigger.profile_id,
                };
                let _ = execute(usecase, &ctx).await;
            }
        }
    });
}

/// Periodic reminder delivery pass.
pub fn start_reminder_delivery_job(ctx: Context) {
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(
            ctx.config.reminder_delivery_interval_secs,
        ));
        loop {
            interval.tick().await;

            let _ = execute(DeliverRemindersUseCase, &ctx).await;
        }
    });
}
