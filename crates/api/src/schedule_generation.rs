use crate::shared::usecase::UseCase;
use reward_scheduler_domain::{Profile, RewardEvent, ID};
use reward_scheduler_infra::{
    Context, EventConfigPayload, EventHistoryPayload, EventStoreError, RecommendNextRequest,
    SettingsPayload,
};
use tracing::{debug, warn};

const HISTORY_WINDOW: usize = 60;

/// One generation pass: for every enabled event config of the targeted
/// profiles that has no active upcoming event, ask the recommender for
/// the next slot and create the event with its reminder.
///
/// The pass is deliberately forgiving: a failing recommender call or a
/// lost race against a concurrent manual create skips that config and
/// the sweep moves on.
#[derive(Debug)]
pub struct GenerateSchedulesUseCase {
    /// Targeted pass for one profile when set, full sweep over all
    /// active profiles otherwise.
    pub profile_id: Option<ID>,
}

#[derive(Debug, Default, PartialEq)]
pub struct GenerationReport {
    pub created_event_ids: Vec<ID>,
    pub skipped_configs: usize,
}

#[derive(Debug)]
pub enum UseCaseErrors {}

#[async_trait::async_trait(?Send)]
impl UseCase for GenerateSchedulesUseCase {
    type Response = GenerationReport;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let profiles: Vec<Profile> = match &self.profile_id {
            Some(profile_id) => match ctx.repos.profiles.find(profile_id).await {
                Some(profile) if profile.active => vec![profile],
                _ => {
                    debug!(
                        "Skipping generation for inactive or unknown profile: {}",
                        profile_id
                    );
                    Vec::new()
                }
            },
            None => ctx.repos.profiles.find_active().await,
        };

        let mut report = GenerationReport::default();
        for profile in profiles {
            self.generate_for_profile(&profile, ctx, &mut report).await;
        }
        Ok(report)
    }
}

impl GenerateSchedulesUseCase {
    async fn generate_for_profile(
        &self,
        profile: &Profile,
        ctx: &Context,
        report: &mut GenerationReport,
    ) {
        let now = ctx.sys.get_utc_now();

        let settings = match ctx.repos.schedule_settings.find_by_profile(&profile.id).await {
            Some(settings) => settings,
            None => {
                debug!(
                    "Profile {} has no schedule settings yet, skipping generation",
                    profile.id
                );
                return;
            }
        };

        for config in ctx.repos.event_configs.find_enabled_deduped(&profile.id).await {
            if ctx
                .repos
                .events
                .find_active_upcoming(&profile.id, &config.id, now, None)
                .await
                .is_some()
            {
                report.skipped_configs += 1;
                continue;
            }

            let history = ctx
                .repos
                .events
                .find_recent_by_event_config(&profile.id, &config.id, HISTORY_WINDOW)
                .await;

            let req = RecommendNextRequest {
                seed: format!("{}:{}", profile.id, config.id),
                now,
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

            let recommendation = match ctx.recommender.recommend_next(&req).await {
                Ok(recommendation) => recommendation,
                Err(e) => {
                    warn!(
                        "Recommender failed for config {} of profile {}: {:?}",
                        config.id, profile.id, e
                    );
                    report.skipped_configs += 1;
                    continue;
                }
            };

            let event = RewardEvent::new(
                profile.id.clone(),
                config.id.clone(),
                recommendation.scheduled_at,
                false,
                None,
                now,
            );
            match ctx.repos.events.insert(&event).await {
                Ok(()) => {}
                Err(EventStoreError::DuplicateActiveUpcoming { .. }) => {
                    // Lost the race against a concurrent create, which is
                    // exactly what the constraint is for
                    report.skipped_configs += 1;
                    continue;
                }
                Err(EventStoreError::Other(e)) => {
                    warn!("Failed to store generated event: {:?}", e);
                    report.skipped_configs += 1;
                    continue;
                }
            }

            if let Err(e) = ctx
                .reminders
                .enqueue(
                    &event.id,
                    event.scheduled_at,
                    settings.reminder_lead_hours,
                    now,
                )
                .await
            {
                warn!("Failed to enqueue reminder for generated event {}: {:?}", event.id, e);
            }

            report.created_event_ids.push(event.id);
        }
    }
}
