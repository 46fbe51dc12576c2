use super::subscribers::{CancelReminderOnEventDeleted, NudgeGenerationOnEventDeleted};
use crate::error::ApiError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{RewardEvent, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_id: ID,
}

pub async fn delete_event_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = DeleteEventUseCase {
        event_id: path_params.event_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(event))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(event_id) => {
                ApiError::NotFound(format!("The event with id: {}, was not found.", event_id))
            }
        })
}

/// Hard delete. The reminder cancellation side effect is best-effort: a
/// job that survives it gets dropped by the send consumer's existence
/// re-check.
#[derive(Debug)]
pub struct DeleteEventUseCase {
    pub event_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventUseCase {
    type Response = RewardEvent;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        ctx.repos
            .events
            .delete(&self.event_id)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(CancelReminderOnEventDeleted),
            Box::new(NudgeGenerationOnEventDeleted),
        ]
    }
}
