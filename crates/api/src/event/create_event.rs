use super::subscribers::{NudgeGenerationOnEventCreated, SyncReminderOnEventCreated};
use crate::error::{ApiError, CONFLICT_UPCOMING_EXISTS};
use crate::shared::{
    guard::{assert_upcoming_unique, UpcomingConflict},
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use reward_scheduler_domain::{resolve_scheduled_at, EventStatus, RewardEvent, ScheduleSettings, ID};
use reward_scheduler_infra::{Context, EventStoreError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub profile_id: ID,
    pub event_config_id: ID,
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Optional local time, `HH:MM`
    pub time: Option<String>,
    pub notes: Option<String>,
}

fn handle_error(e: UseCaseErrors) -> ApiError {
    match e {
        UseCaseErrors::NotFound(entity, id) => {
            ApiError::NotFound(format!("The {} with id: {}, was not found.", entity, id))
        }
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

pub async fn create_event_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let usecase = CreateEventUseCase {
        profile_id: body.profile_id,
        event_config_id: body.event_config_id,
        date: body.date,
        time: body.time,
        notes: body.notes,
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Created().json(event))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub profile_id: ID,
    pub event_config_id: ID,
    pub date: String,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(&'static str, ID),
    InvalidDate(String),
    InvalidTime(String),
    Conflict(UpcomingConflict),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = RewardEvent;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_utc_now();

        if ctx.repos.profiles.find(&self.profile_id).await.is_none() {
            return Err(UseCaseErrors::NotFound("profile", self.profile_id.clone()));
        }
        let config = match ctx.repos.event_configs.find(&self.event_config_id).await {
            Some(config) if config.profile_id == self.profile_id => config,
            _ => {
                return Err(UseCaseErrors::NotFound(
                    "event config",
                    self.event_config_id.clone(),
                ))
            }
        };

        let settings = ctx
            .repos
            .schedule_settings
            .find_by_profile(&self.profile_id)
            .await
            .unwrap_or_else(|| ScheduleSettings::default_for_profile(self.profile_id.clone(), now));

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
            &self.profile_id,
            &config.id,
            EventStatus::Scheduled,
            resolved.scheduled_at,
            None,
            now,
        )
        .await
        .map_err(UseCaseErrors::Conflict)?;

        let event = RewardEvent::new(
            self.profile_id.clone(),
            config.id,
            resolved.scheduled_at,
            resolved.has_explicit_time,
            self.notes.clone(),
            now,
        );

        match ctx.repos.events.insert(&event).await {
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
            Box::new(SyncReminderOnEventCreated),
            Box::new(NudgeGenerationOnEventCreated),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_helpers::{setup, TestContext};

    #[actix_web::main]
    #[test]
    async fn creates_event_resolving_date_through_settings() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let mut usecase = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-18".into(),
            time: None,
            notes: Some("bring tulips".into()),
        };

        let event = usecase.execute(&ctx).await.unwrap();
        assert_eq!(event.status, EventStatus::Scheduled);
        assert!(!event.has_explicit_time);
        assert_eq!(event.original_scheduled_at, event.scheduled_at);
        assert_eq!(event.notes.as_deref(), Some("bring tulips"));
        assert!(ctx.repos.events.find(&event.id).await.is_some());
    }

    #[actix_web::main]
    #[test]
    async fn rejects_second_active_upcoming_event_for_same_config() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let mut usecase = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-18".into(),
            time: Some("18:00".into()),
            notes: None,
        };
        let first = usecase.execute(&ctx).await.unwrap();

        let mut second = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-25".into(),
            time: None,
            notes: None,
        };
        match second.execute(&ctx).await {
            Err(UseCaseErrors::Conflict(conflict)) => {
                assert_eq!(conflict.blocking_event_id, first.id);
                assert_eq!(conflict.event_config_id, config.id);
            }
            other => panic!("Expected conflict, got: {:?}", other),
        }
    }

    #[actix_web::main]
    #[test]
    async fn rejects_unknown_event_config() {
        let TestContext { ctx, profile, .. } = setup().await;

        let mut usecase = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: ID::new(),
            date: "2030-06-18".into(),
            time: None,
            notes: None,
        };

        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::NotFound("event config", _))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn rejects_malformed_date() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let mut usecase = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "18-06-2030".into(),
            time: None,
            notes: None,
        };

        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidDate(_))
        ));
    }
}
