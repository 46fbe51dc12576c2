use super::subscribers::NudgeGenerationOnConfigCreated;
use crate::error::{ApiError, CONFLICT_SLUG_EXISTS};
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{normalize_slug, EventConfig, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

pub const MAX_BASE_INTERVAL_DAYS: u32 = 365;
pub const MAX_JITTER_PCT: f64 = 0.9;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub profile_id: ID,
    pub name: String,
    pub base_interval_days: u32,
    pub jitter_pct: f64,
}

fn handle_error(e: UseCaseErrors) -> ApiError {
    match e {
        UseCaseErrors::ProfileNotFound(profile_id) => ApiError::NotFound(format!(
            "The profile with id: {}, was not found.",
            profile_id
        )),
        UseCaseErrors::InvalidName(name) => ApiError::BadClientData(format!(
            "The name: {}, does not contain any usable characters",
            name
        )),
        UseCaseErrors::InvalidInterval(days) => ApiError::BadClientData(format!(
            "Base interval days must be between 1 and {}, got: {}",
            MAX_BASE_INTERVAL_DAYS, days
        )),
        UseCaseErrors::InvalidJitter(jitter) => ApiError::BadClientData(format!(
            "Jitter pct must be within [0, {}], got: {}",
            MAX_JITTER_PCT, jitter
        )),
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

pub async fn create_event_config_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let usecase = CreateEventConfigUseCase {
        profile_id: body.profile_id,
        name: body.name,
        base_interval_days: body.base_interval_days,
        jitter_pct: body.jitter_pct,
    };

    execute(usecase, &ctx)
        .await
        .map(|config| HttpResponse::Created().json(config))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct CreateEventConfigUseCase {
    pub profile_id: ID,
    pub name: String,
    pub base_interval_days: u32,
    pub jitter_pct: f64,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    ProfileNotFound(ID),
    InvalidName(String),
    InvalidInterval(u32),
    InvalidJitter(f64),
    SlugTaken(String),
    StorageError,
}

pub fn validate_interval(days: u32) -> Result<(), UseCaseErrors> {
    if (1..=MAX_BASE_INTERVAL_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(UseCaseErrors::InvalidInterval(days))
    }
}

pub fn validate_jitter(jitter: f64) -> Result<(), UseCaseErrors> {
    if (0.0..=MAX_JITTER_PCT).contains(&jitter) {
        Ok(())
    } else {
        Err(UseCaseErrors::InvalidJitter(jitter))
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventConfigUseCase {
    type Response = EventConfig;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_utc_now();

        if ctx.repos.profiles.find(&self.profile_id).await.is_none() {
            return Err(UseCaseErrors::ProfileNotFound(self.profile_id.clone()));
        }
        validate_interval(self.base_interval_days)?;
        validate_jitter(self.jitter_pct)?;

        let slug = normalize_slug(&self.name);
        if slug.is_empty() {
            return Err(UseCaseErrors::InvalidName(self.name.clone()));
        }
        if ctx
            .repos
            .event_configs
            .find_by_slug(&self.profile_id, &slug)
            .await
            .is_some()
        {
            return Err(UseCaseErrors::SlugTaken(slug));
        }

        let config = EventConfig::new(
            self.profile_id.clone(),
            &self.name,
            self.base_interval_days,
            self.jitter_pct,
            now,
        );
        if ctx.repos.event_configs.insert(&config).await.is_err() {
            return Err(UseCaseErrors::StorageError);
        }

        Ok(config)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NudgeGenerationOnConfigCreated)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_helpers::{setup, TestContext};

    #[actix_web::main]
    #[test]
    async fn creates_config_and_rejects_slug_collisions() {
        let TestContext { ctx, profile, .. } = setup().await;

        let mut usecase = CreateEventConfigUseCase {
            profile_id: profile.id.clone(),
            name: "Movie Night".into(),
            base_interval_days: 21,
            jitter_pct: 0.1,
        };
        let config = usecase.execute(&ctx).await.unwrap();
        assert_eq!(config.slug, "movie-night");
        assert!(config.enabled);

        // "movie night!" normalizes to the same slug
        let mut collision = CreateEventConfigUseCase {
            profile_id: profile.id.clone(),
            name: "movie night!".into(),
            base_interval_days: 10,
            jitter_pct: 0.1,
        };
        assert!(matches!(
            collision.execute(&ctx).await,
            Err(UseCaseErrors::SlugTaken(_))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn rejects_out_of_range_fields() {
        let TestContext { ctx, profile, .. } = setup().await;

        let mut usecase = CreateEventConfigUseCase {
            profile_id: profile.id.clone(),
            name: "Movie Night".into(),
            base_interval_days: 0,
            jitter_pct: 0.1,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidInterval(0))
        ));

        for jitter_pct in [0.95, 1.0, -0.1] {
            let mut usecase = CreateEventConfigUseCase {
                profile_id: profile.id.clone(),
                name: "Movie Night".into(),
                base_interval_days: 10,
                jitter_pct,
            };
            assert!(matches!(
                usecase.execute(&ctx).await,
                Err(UseCaseErrors::InvalidJitter(_))
            ));
        }

        // 0.9 is the inclusive upper bound
        let mut usecase = CreateEventConfigUseCase {
            profile_id: profile.id.clone(),
            name: "Movie Night".into(),
            base_interval_days: 10,
            jitter_pct: 0.9,
        };
        assert!(usecase.execute(&ctx).await.is_ok());

        let mut usecase = CreateEventConfigUseCase {
            profile_id: profile.id.clone(),
            name: "!!!".into(),
            base_interval_days: 10,
            jitter_pct: 0.1,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidName(_))
        ));
    }
}
