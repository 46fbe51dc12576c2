use super::subscribers::{CancelReminderOnEventCompleted, NudgeGenerationOnEventCompleted};
use crate::error::ApiError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{EventStatus, RewardEvent, SentimentLevel, ID};
use reward_scheduler_infra::{Context, EventStoreError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_id: ID,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub sentiment_level: SentimentLevel,
    pub notes: Option<String>,
}

pub async fn complete_event_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = CompleteEventUseCase {
        event_id: path_params.event_id.clone(),
        sentiment_level: body.sentiment_level,
        notes: body.notes.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(event))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(event_id) => {
                ApiError::NotFound(format!("The event with id: {}, was not found.", event_id))
            }
            UseCaseErrors::InvalidStatus(status) => ApiError::BadClientData(format!(
                "An event with status: {:?} cannot be completed",
                status
            )),
            UseCaseErrors::StorageError => ApiError::InternalError,
        })
}

#[derive(Debug)]
pub struct CompleteEventUseCase {
    pub event_id: ID,
    pub sentiment_level: SentimentLevel,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    InvalidStatus(EventStatus),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CompleteEventUseCase {
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

        event.complete(self.sentiment_level, self.notes.clone(), now);

        match ctx.repos.events.save(&event).await {
            Ok(()) => Ok(event),
            Err(EventStoreError::DuplicateActiveUpcoming { .. }) => {
                // Completing never makes an event active upcoming
                Err(UseCaseErrors::StorageError)
            }
            Err(EventStoreError::Other(_)) => Err(UseCaseErrors::StorageError),
        }
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(CancelReminderOnEventCompleted),
            Box::new(NudgeGenerationOnEventCompleted),
        ]
    }
}
