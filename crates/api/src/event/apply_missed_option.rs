use super::recovery::{build_missed_options, RecoveryError};
use super::subscribers::{NudgeGenerationOnOptionApplied, SyncReminderOnOptionApplied};
use crate::error::{ApiError, CONFLICT_UPCOMING_EXISTS};
use crate::shared::{
    guard::{assert_upcoming_unique, UpcomingConflict},
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{EventStatus, RewardEvent, ID};
use reward_scheduler_infra::{Context, EventStoreError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_id: ID,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub option_id: String,
    pub actor: Option<String>,
}

fn handle_error(e: UseCaseErrors) -> ApiError {
    match e {
        UseCaseErrors::NotFound(event_id) => {
            ApiError::NotFound(format!("The event with id: {}, was not found.", event_id))
        }
        UseCaseErrors::OptionNotFound(option_id) => ApiError::NotFound(format!(
            "The recovery option with id: {}, was not found.",
            option_id
        )),
        UseCaseErrors::NotMissed(status) => ApiError::BadClientData(format!(
            "Recovery options can only be applied to missed events, status is: {:?}",
            status
        )),
        UseCaseErrors::Conflict(conflict) => ApiError::Conflict {
            code: CONFLICT_UPCOMING_EXISTS,
            message: format!(
                "An active upcoming event already exists for event config: {}",
                conflict.event_config_id
            ),
            blocking_event_id: Some(conflict.blocking_event_id),
        },
        UseCaseErrors::RecommenderFailure(e) => ApiError::Upstream(e),
        UseCaseErrors::StorageError => ApiError::InternalError,
    }
}

pub async fn apply_missed_option_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let usecase = ApplyMissedOptionUseCase {
        event_id: path_params.event_id.clone(),
        option_id: body.option_id,
        actor: body.actor.unwrap_or_else(|| "user".into()),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(event))
        .map_err(handle_error)
}

/// Applies one of the deterministic recovery options to a missed event.
/// The options are recomputed rather than looked up: they were never
/// stored, and identical inputs reproduce the set the client was shown.
#[derive(Debug)]
pub struct ApplyMissedOptionUseCase {
    pub event_id: ID,
    pub option_id: String,
    pub actor: String,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    OptionNotFound(String),
    NotMissed(EventStatus),
    Conflict(UpcomingConflict),
    RecommenderFailure(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ApplyMissedOptionUseCase {
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

        if event.status != EventStatus::Missed {
            return Err(UseCaseErrors::NotMissed(event.status));
        }

        let options = build_missed_options(&event, ctx).await.map_err(|e| match e {
            RecoveryError::ConfigMissing(id) => {
                UseCaseErrors::RecommenderFailure(format!("Event config {} is gone", id))
            }
            RecoveryError::Upstream(e) => UseCaseErrors::RecommenderFailure(e),
        })?;

        let option = options
            .into_iter()
            .find(|option| option.option_id == self.option_id)
            .ok_or_else(|| UseCaseErrors::OptionNotFound(self.option_id.clone()))?;

        assert_upcoming_unique(
            ctx,
            &event.profile_id,
            &event.event_config_id,
            EventStatus::Rescheduled,
            option.proposed_at,
            Some(&event.id),
            now,
        )
        .await
        .map_err(UseCaseErrors::Conflict)?;

        // The option proposes a concrete instant, so the time is explicit
        event.reschedule(
            option.proposed_at,
            true,
            format!("Applied {} missed option", option.kind),
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
            Box::new(SyncReminderOnOptionApplied),
            Box::new(NudgeGenerationOnOptionApplied),
        ]
    }
}
