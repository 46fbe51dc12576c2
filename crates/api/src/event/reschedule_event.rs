use super::subscribers::{NudgeGenerationOnEventRescheduled, SyncReminderOnEventRescheduled};
use crate::error::{ApiError, CONFLICT_UPCOMING_EXISTS};
use crate::shared::{
    guard::{assert_upcoming_unique, UpcomingConflict},
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use reward_scheduler_domain::{
    resolve_scheduled_at, EventStatus, RewardEvent, ScheduleSettings, ID,
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
    pub date: String,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub actor: Option<String>,
}

fn handle_error(e: UseCaseErrors) -> ApiError {
    match e {
        UseCaseErrors::NotFound(event_id) => {
            ApiError::NotFound(format!("The event with id: {}, was not found.", event_id))
        }
        UseCaseErrors::ReasonRequired => {
            ApiError::BadClientData("A non-empty reason is required to reschedule".into())
        }
        UseCaseErrors::InvalidStatus(status) => ApiError::BadClientData(format!(
            "An event with status: {:?} cannot be rescheduled",
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

pub async fn reschedule_event_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let usecase = RescheduleEventUseCase {
        event_id: path_params.event_id.clone(),
        date: body.date,
        time: body.time,
        reason: body.reason,
        actor: body.actor.unwrap_or_else(|| "user".into()),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(event))
        .map_err(handle_error)
}

/// Manual reschedule. Unlike the schedule patch this also lifts a missed
/// event back into the active flow by setting status RESCHEDULED.
#[derive(Debug)]
pub struct RescheduleEventUseCase {
    pub event_id: ID,
    pub date: String,
    pub time: Option<String>,
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
impl UseCase for RescheduleEventUseCase {
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

        match event.status {
            EventStatus::Scheduled | EventStatus::Rescheduled | EventStatus::Missed => {}
            status => return Err(UseCaseErrors::InvalidStatus(status)),
        }

        let reason = self
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .ok_or(UseCaseErrors::ReasonRequired)?
            .to_string();

        let settings = ctx
            .repos
            .schedule_settings
            .find_by_profile(&event.profile_id)
            .await
            .unwrap_or_else(|| {
                ScheduleSettings::default_for_profile(event.profile_id.clone(), now)
            });

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| UseCaseErrors::InvalidDate(self.date.clone()))?;
        let time = match &self.time {
            Some(time) => Some(
                NaiveTime::parse_from_str(time, "%H:%M")
                    .map_err(|_| UseCaseErrors::InvalidTime(time.clone()))?,
            ),
            None => None,
        };

        let resolved =
            resolve_scheduled_at(date, time, &settings.timezone, &settings.allowed_windows);

        assert_upcoming_unique(
            ctx,
            &event.profile_id,
            &event.event_config_id,
            EventStatus::Rescheduled,
            resolved.scheduled_at,
            Some(&event.id),
            now,
        )
        .await
        .map_err(UseCaseErrors::Conflict)?;

        event.reschedule(
            resolved.scheduled_at,
            resolved.has_explicit_time,
            reason,
            self.actor.clone(),
            now,
        );

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
            Box::new(SyncReminderOnEventRescheduled),
            Box::new(NudgeGenerationOnEventRescheduled),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::create_event::CreateEventUseCase;
    use crate::event::miss_event::MissEventUseCase;
    use crate::event::test_helpers::{setup, TestContext};

    #[actix_web::main]
    #[test]
    async fn reschedules_a_missed_event_back_into_the_flow() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let mut create = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-18".into(),
            time: None,
            notes: None,
        };
        let event = create.execute(&ctx).await.unwrap();

        let mut miss = MissEventUseCase {
            event_id: event.id.clone(),
            reason: None,
        };
        miss.execute(&ctx).await.unwrap();

        let mut usecase = RescheduleEventUseCase {
            event_id: event.id.clone(),
            date: "2030-06-25".into(),
            time: Some("19:30".into()),
            reason: Some("second try".into()),
            actor: "user".into(),
        };
        let rescheduled = usecase.execute(&ctx).await.unwrap();

        assert_eq!(rescheduled.status, EventStatus::Rescheduled);
        assert!(rescheduled.has_explicit_time);
        assert_eq!(rescheduled.adjustments.last().unwrap().reason, "second try");
    }

    #[actix_web::main]
    #[test]
    async fn requires_a_reason() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let mut create = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-18".into(),
            time: None,
            notes: None,
        };
        let event = create.execute(&ctx).await.unwrap();

        let mut usecase = RescheduleEventUseCase {
            event_id: event.id.clone(),
            date: "2030-06-25".into(),
            time: None,
            reason: None,
            actor: "user".into(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::ReasonRequired)
        ));
    }
}
