use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{ScheduleSettings, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub profile_id: ID,
}

pub async fn get_settings_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = GetSettingsUseCase {
        profile_id: path_params.profile_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|settings| HttpResponse::Ok().json(settings))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(profile_id) => ApiError::NotFound(format!(
                "Schedule settings for profile: {}, were not found.",
                profile_id
            )),
        })
}

#[derive(Debug)]
pub struct GetSettingsUseCase {
    pub profile_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetSettingsUseCase {
    type Response = ScheduleSettings;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        ctx.repos
            .schedule_settings
            .find_by_profile(&self.profile_id)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.profile_id.clone()))
    }
}
