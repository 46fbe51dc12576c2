use super::create_event_config::{validate_interval, validate_jitter};
use super::subscribers::NudgeGenerationOnConfigUpdated;
use crate::error::{ApiError, CONFLICT_SLUG_EXISTS};
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{normalize_slug, EventConfig, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_config_id: ID,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub name: Option<String>,
    pub base_interval_days: Option<u32>,
    pub jitter_pct: Option<f64>,
    pub enabled: Option<bool>,
}

fn handle_error(e: UseCaseErrors) -> ApiError {
    match e {
        UseCaseErrors::NotFound(config_id) => ApiError::NotFound(format!(
            "The event config with id: {}, was not found.",
            config_id
        )),
        UseCaseErrors::Invalid(e) => {
            use super::create_event_config::{
                UseCaseErrors as CreateErrors, MAX_BASE_INTERVAL_DAYS, MAX_JITTER_PCT,
            };
            match e {
                CreateErrors::InvalidName(name) => ApiError::BadClientData(format!(
                    "The name: {}, does not contain any usable characters",
                    name
                )),
                CreateErrors::InvalidInterval(days) => ApiError::BadClientData(format!(
                    "Base interval days must be between 1 and {}, got: {}",
                    MAX_BASE_INTERVAL_DAYS, days
                )),
                CreateErrors::InvalidJitter(jitter) => ApiError::BadClientData(format!(
                    "Jitter pct must be within [0, {}], got: {}",
                    MAX_JITTER_PCT, jitter
                )),
                _ => ApiError::InternalError,
            }
        }
        UseCaseErrors::SlugTaken(slug) => ApiError::Conflict {
            code: CONFLICT_SLUG_EXISTS,
            message: format!(
                "An event config with slug: {}, already exists for this profile",
                slug
            ),
            blocking_event_id: None,
        },
        UseCaseErrors::StorageError => ApiError::InternalError,
    }
}

pub async fn update_event_config_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let usecase = UpdateEventConfigUseCase {
        event_config_id: path_params.event_config_id.clone(),
        name: body.name,
        base_interval_days: body.base_interval_days,
        jitter_pct: body.jitter_pct,
        enabled: body.enabled,
    };

    execute(usecase, &ctx)
        .await
        .map(|config| HttpResponse::Ok().json(config))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct UpdateEventConfigUseCase {
    pub event_config_id: ID,
    pub name: Option<String>,
    pub base_interval_days: Option<u32>,
    pub jitter_pct: Option<f64>,
    pub enabled: Option<bool>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    Invalid(super::create_event_config::UseCaseErrors),
    SlugTaken(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventConfigUseCase {
    type Response = EventConfig;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_utc_now();

        let mut config = ctx
            .repos
            .event_configs
            .find(&self.event_config_id)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_config_id.clone()))?;

        if let Some(days) = self.base_interval_days {
            validate_interval(days).map_err(UseCaseErrors::Invalid)?;
            config.base_interval_days = days;
        }
        if let Some(jitter) = self.jitter_pct {
            validate_jitter(jitter).map_err(UseCaseErrors::Invalid)?;
            config.jitter_pct = jitter;
        }
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }

        if let Some(name) = &self.name {
            // A rename re-derives the slug and must not collide with a
            // sibling config
            let slug = normalize_slug(name);
            if slug.is_empty() {
                return Err(UseCaseErrors::Invalid(
                    super::create_event_config::UseCaseErrors::InvalidName(name.clone()),
                ));
            }
            match ctx
                .repos
                .event_configs
                .find_by_slug(&config.profile_id, &slug)
                .await
            {
                Some(existing) if existing.id != config.id => {
                    return Err(UseCaseErrors::SlugTaken(slug))
                }
                _ => {}
            }
            config.name = name.trim().to_string();
            config.slug = slug;
        }

        config.updated = now;
        if ctx.repos.event_configs.save(&config).await.is_err() {
            return Err(UseCaseErrors::StorageError);
        }

        Ok(config)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NudgeGenerationOnConfigUpdated)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_helpers::{setup, TestContext};
    use chrono::Utc;

    #[actix_web::main]
    #[test]
    async fn rename_rederives_slug_and_checks_conflicts() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let other = EventConfig::new(profile.id.clone(), "movie night", 21, 0.1, Utc::now());
        ctx.repos.event_configs.insert(&other).await.unwrap();

        let mut usecase = UpdateEventConfigUseCase {
            event_config_id: config.id.clone(),
            name: Some("Fresh Flowers".into()),
            base_interval_days: None,
            jitter_pct: None,
            enabled: None,
        };
        let updated = usecase.execute(&ctx).await.unwrap();
        assert_eq!(updated.name, "Fresh Flowers");
        assert_eq!(updated.slug, "fresh-flowers");

        let mut collision = UpdateEventConfigUseCase {
            event_config_id: config.id.clone(),
            name: Some("Movie Night!".into()),
            base_interval_days: None,
            jitter_pct: None,
            enabled: None,
        };
        assert!(matches!(
            collision.execute(&ctx).await,
            Err(UseCaseErrors::SlugTaken(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn disables_config() {
        let TestContext { ctx, config, .. } = setup().await;

        let mut usecase = UpdateEventConfigUseCase {
            event_config_id: config.id.clone(),
            name: None,
            base_interval_days: None,
            jitter_pct: None,
            enabled: Some(false),
        };
        let updated = usecase.execute(&ctx).await.unwrap();
        assert!(!updated.enabled);
        assert_eq!(updated.slug, config.slug);
    }
}
