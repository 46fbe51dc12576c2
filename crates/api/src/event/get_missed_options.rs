use super::recovery::{build_missed_options, RecoveryError};
use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{EventStatus, MissedRecoveryOption, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_id: ID,
}

pub async fn get_missed_options_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = GetMissedOptionsUseCase {
        event_id: path_params.event_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|options| HttpResponse::Ok().json(options))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(event_id) => {
                ApiError::NotFound(format!("The event with id: {}, was not found.", event_id))
            }
            UseCaseErrors::NotMissed(status) => ApiError::BadClientData(format!(
                "Recovery options only exist for missed events, status is: {:?}",
                status
            )),
            UseCaseErrors::RecommenderFailure(e) => ApiError::Upstream(e),
        })
}

#[derive(Debug)]
pub struct GetMissedOptionsUseCase {
    pub event_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    NotMissed(EventStatus),
    RecommenderFailure(String),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetMissedOptionsUseCase {
    type Response = Vec<MissedRecoveryOption>;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_id.clone()))?;

        if event.status != EventStatus::Missed {
            return Err(UseCaseErrors::NotMissed(event.status));
        }

        build_missed_options(&event, ctx).await.map_err(|e| match e {
            RecoveryError::ConfigMissing(id) => {
                UseCaseErrors::RecommenderFailure(format!("Event config {} is gone", id))
            }
            RecoveryError::Upstream(e) => UseCaseErrors::RecommenderFailure(e),
        })
    }
}
