use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{EventConfig, Profile, ScheduleSettings};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub name: String,
}

pub async fn create_profile_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = CreateProfileUseCase {
        name: body.name.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|profile| HttpResponse::Created().json(profile))
        .map_err(|e| match e {
            UseCaseErrors::InvalidName => {
                ApiError::BadClientData("The profile name must not be empty".into())
            }
            UseCaseErrors::StorageError => ApiError::InternalError,
        })
}

/// New profiles start fully usable: default schedule settings and the
/// default set of event configs are seeded in the same flow.
#[derive(Debug)]
pub struct CreateProfileUseCase {
    pub name: String,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidName,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateProfileUseCase {
    type Response = Profile;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_utc_now();

        if self.name.trim().is_empty() {
            return Err(UseCaseErrors::InvalidName);
        }

        let profile = Profile::new(&self.name, now);
        if ctx.repos.profiles.insert(&profile).await.is_err() {
            return Err(UseCaseErrors::StorageError);
        }

        let settings = ScheduleSettings::default_for_profile(profile.id.clone(), now);
        if ctx.repos.schedule_settings.upsert(&settings).await.is_err() {
            return Err(UseCaseErrors::StorageError);
        }

        for config in EventConfig::defaults_for_profile(&profile.id, now) {
            if ctx.repos.event_configs.insert(&config).await.is_err() {
                return Err(UseCaseErrors::StorageError);
            }
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use reward_scheduler_infra::setup_context;

    #[actix_web::main]
    #[test]
    async fn seeds_defaults_for_new_profiles() {
        let ctx = setup_context().await;

        let mut usecase = CreateProfileUseCase {
            name: "us two".into(),
        };
        let profile = usecase.execute(&ctx).await.unwrap();
        assert!(profile.active);

        let settings = ctx
            .repos
            .schedule_settings
            .find_by_profile(&profile.id)
            .await
            .unwrap();
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.reminder_lead_hours, 24);

        let configs = ctx.repos.event_configs.find_by_profile(&profile.id).await;
        assert_eq!(configs.len(), 4);
        let slugs: Vec<_> = configs.iter().map(|c| c.slug.as_str()).collect();
        assert!(slugs.contains(&"flowers"));
        assert!(slugs.contains(&"thoughtful-message"));
    }

    #[actix_web::main]
    #[test]
    async fn rejects_blank_names() {
        let ctx = setup_context().await;

        let mut usecase = CreateProfileUseCase { name: "  ".into() };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidName)
        ));
    }
}
