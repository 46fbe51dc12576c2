use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{Profile, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub profile_id: ID,
}

pub async fn get_profile_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = GetProfileUseCase {
        profile_id: path_params.profile_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|profile| HttpResponse::Ok().json(profile))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(profile_id) => ApiError::NotFound(format!(
                "The profile with id: {}, was not found.",
                profile_id
            )),
        })
}

#[derive(Debug)]
pub struct GetProfileUseCase {
    pub profile_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetProfileUseCase {
    type Response = Profile;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        ctx.repos
            .profiles
            .find(&self.profile_id)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.profile_id.clone()))
    }
}
