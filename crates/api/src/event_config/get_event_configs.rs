use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{EventConfig, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub profile_id: ID,
}

pub async fn get_event_configs_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = GetEventConfigsUseCase {
        profile_id: path_params.profile_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|configs| HttpResponse::Ok().json(configs))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(profile_id) => ApiError::NotFound(format!(
                "The profile with id: {}, was not found.",
                profile_id
            )),
        })
}

#[derive(Debug)]
pub struct GetEventConfigsUseCase {
    pub profile_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventConfigsUseCase {
    type Response = Vec<EventConfig>;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        if ctx.repos.profiles.find(&self.profile_id).await.is_none() {
            return Err(UseCaseErrors::NotFound(self.profile_id.clone()));
        }
        Ok(ctx.repos.event_configs.find_by_profile(&self.profile_id).await)
    }
}
