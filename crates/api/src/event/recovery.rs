use reward_scheduler_domain::{MissedRecoveryOption, RewardEvent, ScheduleSettings, ID};
use reward_scheduler_infra::{
    Context, EventConfigPayload, EventHistoryPayload, MissedOptionsRequest, SettingsPayload,
};

const HISTORY_WINDOW: usize = 60;

#[derive(Debug)]
pub enum RecoveryError {
    ConfigMissing(ID),
    Upstream(String),
}

/// Computes the recovery options for a missed event by querying the
/// recommender with the event id as the deterministic seed. Options are
/// never persisted: as long as the event stays missed and untouched,
/// recomputing yields the same set, so option ids handed to a client
/// remain applicable.
pub async fn build_missed_options(
    event: &RewardEvent,
    ctx: &Context,
) -> Result<Vec<MissedRecoveryOption>, RecoveryError> {
    let now = ctx.sys.get_utc_now();

    let config = ctx
        .repos
        .event_configs
        .find(&event.event_config_id)
        .await
        .ok_or_else(|| RecoveryError::ConfigMissing(event.event_config_id.clone()))?;

    let settings = ctx
        .repos
        .schedule_settings
        .find_by_profile(&event.profile_id)
        .await
        .unwrap_or_else(|| ScheduleSettings::default_for_profile(event.profile_id.clone(), now));

    let history = ctx
        .repos
        .events
        .find_recent_by_event_config(&event.profile_id, &event.event_config_id, HISTORY_WINDOW)
        .await;

    let req = MissedOptionsRequest {
        seed: event.id.to_string(),
        now,
        event_id: event.id.clone(),
        current_scheduled_at: event.scheduled_at,
        event_config: EventConfigPayload {
            id: config.id.clone(),
            name: config.name.clone(),
            base_interval_days: config.base_interval_days,
            jitter_pct: config.jitter_pct,
        },
        settings: SettingsPayload {
            timezone: settings.timezone.clone(),
            min_gap_hours: settings.min_gap_hours,
            allowed_windows: settings.allowed_windows.clone(),
            recurring_blackout_weekdays: settings.recurring_blackout_weekdays.clone(),
            blackout_dates: settings.blackout_dates.clone(),
        },
        event_history: history
            .into_iter()
            .map(|e| EventHistoryPayload {
                scheduled_at: e.scheduled_at,
                status: e.status,
                completed_at: e.completed_at,
                missed_at: e.missed_at,
                sentiment_level: e.sentiment_level,
            })
            .collect(),
    };

    ctx.recommender
        .missed_options(&req)
        .await
        .map_err(|e| RecoveryError::Upstream(format!("{:?}", e)))
}
