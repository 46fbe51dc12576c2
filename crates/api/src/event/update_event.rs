use super::subscribers::{NudgeGenerationOnEventUpdated, SyncReminderOnEventUpdated};
use crate::error::{ApiError, CONFLICT_UPCOMING_EXISTS};
use crate::shared::{
    guard::{assert_upcoming_unique, UpcomingConflict},
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use reward_scheduler_domain::{
    local_date_of, resolve_scheduled_at, EventStatus, RewardEvent, ScheduleSettings, ID,
};
use reward_scheduler_infra::{Context, EventStoreError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_id: ID,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
    /// Required when `date`/`time` resolve to a different instant than
    /// the current one
    pub reason: Option<String>,
    pub actor: Option<String>,
}

fn handle_error(e: UseCaseErrors) -> ApiError {
    match e {
        UseCaseErrors::NotFound(event_id) => {
            ApiError::NotFound(format!("The event with id: {}, was not found.", event_id))
        }
        UseCaseErrors::ReasonRequired => ApiError::BadClientData(
            "A non-empty reason is required when changing the schedule".into(),
        ),
        UseCaseErrors::InvalidStatus(status) => ApiError::BadClientData(format!(
            "The schedule of an event with status: {:?} cannot be changed",
            status
        )),
        UseCaseErrors::InvalidDate(date) => ApiError::BadClientData(format!(
            "Invalid date: {}. Expected format: YYYY-MM-DD",
            date
        )),
        UseCaseErrors::InvalidTime(time) => {
            ApiError::BadClientData(format!("Invalid time: {}. Expected format: HH:MM", time))
        }
        UseCaseErrors::Conflict(conflict) => ApiError::Conflict {
            code: CONFLICT_UPCOMING_EXISTS,
            message: format!(
                "An active upcoming event already exists for event config: {}",
                conflict.event_config_id
            ),
            blocking_event_id: Some(conflict.blocking_event_id),
        },
        UseCaseErrors::StorageError => ApiError::InternalError,
    }
}

pub async fn update_event_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let usecase = UpdateEventUseCase {
        event_id: path_params.event_id.clone(),
        date: body.date,
        time: body.time,
        notes: body.notes,
        reason: body.reason,
        actor: body.actor.unwrap_or_else(|| "user".into()),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(event))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub event_id: ID,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
    pub reason: Option<String>,
    pub actor: String,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    ReasonRequired,
    InvalidStatus(EventStatus),
    InvalidDate(String),
    InvalidTime(String),
    Conflict(UpcomingConflict),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = RewardEvent;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_utc_now();

        let mut event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))?;

        let patches_schedule = self.date.is_some() || self.time.is_some();
        if patches_schedule {
            let settings = ctx
                .repos
                .schedule_settings
                .find_by_profile(&event.profile_id)
                .await
                .unwrap_or_else(|| {
                    ScheduleSettings::default_for_profile(event.profile_id.clone(), now)
                });

            let date = match &self.date {
                Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| UseCaseErrors::InvalidDate(date.clone()))?,
                // Time-only patch keeps the event on its local calendar day
                None => local_date_of(event.scheduled_at, &settings.timezone),
            };
            let time = match &self.time {
                Some(time) => Some(
                    NaiveTime::parse_from_str(time, "%H:%M")
                        .map_err(|_| UseCaseErrors::InvalidTime(time.clone()))?,
                ),
                None if event.has_explicit_time => {
                    // Date-only patch preserves an explicitly chosen time
                    Some(match settings.timezone.parse::<Tz>() {
                        Ok(tz) => event.scheduled_at.with_timezone(&tz).time(),
                        Err(_) => event.scheduled_at.naive_utc().time(),
                    })
                }
                None => None,
            };

            let resolved =
                resolve_scheduled_at(date, time, &settings.timezone, &settings.allowed_windows);

            // A patch resolving to the current instant is not a schedule
            // change: no reason needed, no adjustment logged
            if resolved.scheduled_at != event.scheduled_at {
                match event.status {
                    EventStatus::Scheduled | EventStatus::Rescheduled => {}
                    status => return Err(UseCaseErrors::InvalidStatus(status)),
                }
                let reason = self
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .ok_or(UseCaseErrors::ReasonRequired)?
                    .to_string();

                assert_upcoming_unique(
                    ctx,
                    &event.profile_id,
                    &event.event_config_id,
                    event.status,
                    resolved.scheduled_at,
                    Some(&event.id),
                    now,
                )
                .await
                .map_err(UseCaseErrors::Conflict)?;

                event.change_schedule(
                    resolved.scheduled_at,
                    resolved.has_explicit_time,
                    reason,
                    self.actor.clone(),
                    now,
                );
            }
        }

        if let Some(notes) = &self.notes {
            event.notes = Some(notes.clone());
            event.updated = now;
        }

        match ctx.repos.events.save(&event).await {
            Ok(()) => Ok(event),
            Err(EventStoreError::DuplicateActiveUpcoming {
                event_config_id,
                existing_event_id,
            }) => Err(UseCaseErrors::Conflict(UpcomingConflict {
                event_config_id,
                blocking_event_id: existing_event_id,
            })),
            Err(EventStoreError::Other(_)) => Err(UseCaseErrors::StorageError),
        }
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(SyncReminderOnEventUpdated),
            Box::new(NudgeGenerationOnEventUpdated),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::create_event::CreateEventUseCase;
    use crate::event::test_helpers::{setup, TestContext};

    async fn scheduled_event(ctx: &Context, profile_id: &ID, config_id: &ID) -> RewardEvent {
        let mut usecase = CreateEventUseCase {
            profile_id: profile_id.clone(),
            event_config_id: config_id.clone(),
            date: "2030-06-18".into(),
            time: Some("18:00".into()),
            notes: None,
        };
        usecase.execute(ctx).await.unwrap()
    }

    #[actix_web::main]
    #[test]
    async fn schedule_change_requires_reason_and_logs_adjustment() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;
        let event = scheduled_event(&ctx, &profile.id, &config.id).await;

        let mut without_reason = UpdateEventUseCase {
            event_id: event.id.clone(),
            date: Some("2030-06-20".into()),
            time: None,
            notes: None,
            reason: Some("   ".into()),
            actor: "user".into(),
        };
        assert!(matches!(
            without_reason.execute(&ctx).await,
            Err(UseCaseErrors::ReasonRequired)
        ));

        let mut usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            date: Some("2030-06-20".into()),
            time: None,
            notes: None,
            reason: Some("anniversary moved".into()),
            actor: "user-1".into(),
        };
        let updated = usecase.execute(&ctx).await.unwrap();

        assert_eq!(updated.adjustments.len(), 1);
        assert_eq!(updated.adjustments[0].from_at, event.scheduled_at);
        assert_eq!(updated.adjustments[0].to_at, updated.scheduled_at);
        assert_eq!(updated.adjustments[0].reason, "anniversary moved");
        assert_eq!(updated.adjustments[0].actor, "user-1");
        assert_eq!(updated.original_scheduled_at, event.original_scheduled_at);
        // Date-only patch keeps the explicitly chosen 18:00
        assert!(updated.has_explicit_time);
        // Default settings timezone is UTC
        use chrono::TimeZone;
        assert_eq!(
            updated.scheduled_at,
            chrono::Utc.ymd(2030, 6, 20).and_hms(18, 0, 0)
        );
    }

    #[actix_web::main]
    #[test]
    async fn notes_only_patch_needs_no_reason() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;
        let event = scheduled_event(&ctx, &profile.id, &config.id).await;

        let mut usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            date: None,
            time: None,
            notes: Some("wrap in red paper".into()),
            reason: None,
            actor: "user".into(),
        };
        let updated = usecase.execute(&ctx).await.unwrap();

        assert_eq!(updated.notes.as_deref(), Some("wrap in red paper"));
        assert_eq!(updated.scheduled_at, event.scheduled_at);
        assert!(updated.adjustments.is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn patch_resolving_to_current_instant_is_a_noop() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;
        let event = scheduled_event(&ctx, &profile.id, &config.id).await;

        // Same date and time as the event already has, and no reason
        let mut usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            date: Some("2030-06-18".into()),
            time: Some("18:00".into()),
            notes: None,
            reason: None,
            actor: "user".into(),
        };
        let updated = usecase.execute(&ctx).await.unwrap();

        assert_eq!(updated.scheduled_at, event.scheduled_at);
        assert!(updated.has_explicit_time);
        assert!(updated.adjustments.is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn rejects_schedule_change_on_completed_event() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;
        let mut event = scheduled_event(&ctx, &profile.id, &config.id).await;
        event.complete(
            reward_scheduler_domain::SentimentLevel::Well,
            None,
            chrono::Utc::now(),
        );
        ctx.repos.events.save(&event).await.unwrap();

        let mut usecase = UpdateEventUseCase {
            event_id: event.id.clone(),
            date: Some("2030-06-20".into()),
            time: None,
            notes: None,
            reason: Some("too late".into()),
            actor: "user".into(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidStatus(EventStatus::Completed))
        ));
    }
}
