use super::subscribers::{CancelRemindersOnConfigDeleted, NudgeGenerationOnConfigDeleted};
use crate::error::ApiError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{EventConfig, ID};
use reward_scheduler_infra::Context;
use serde::{Deserialize, Serialize};

// Cascade scan bound, far beyond any realistic per-config history
const CASCADE_SCAN_LIMIT: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_config_id: ID,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEventConfigResponse {
    pub config: EventConfig,
    pub deleted_event_ids: Vec<ID>,
}

pub async fn delete_event_config_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = DeleteEventConfigUseCase {
        event_config_id: path_params.event_config_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(res))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(config_id) => ApiError::NotFound(format!(
                "The event config with id: {}, was not found.",
                config_id
            )),
        })
}

/// Hard delete that cascades to every event of the config. The response
/// carries the deleted event ids so the reminder cancellation side effect
/// knows which jobs to sweep.
#[derive(Debug)]
pub struct DeleteEventConfigUseCase {
    pub event_config_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventConfigUseCase {
    type Response = DeletedEventConfigResponse;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let config = ctx
            .repos
            .event_configs
            .delete(&self.event_config_id)
            .await
            .ok_or_else(|| UseCaseErrors::NotFound(self.event_config_id.clone()))?;

        let deleted_event_ids = ctx
            .repos
            .events
            .find_recent_by_event_config(&config.profile_id, &config.id, CASCADE_SCAN_LIMIT)
            .await
            .into_iter()
            .map(|event| event.id)
            .collect();
        ctx.repos.events.delete_by_event_config(&config.id).await;

        Ok(DeletedEventConfigResponse {
            config,
            deleted_event_ids,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(CancelRemindersOnConfigDeleted),
            Box::new(NudgeGenerationOnConfigDeleted),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::create_event::CreateEventUseCase;
    use crate::event::test_helpers::{setup, TestContext};

    #[actix_web::main]
    #[test]
    async fn deleting_config_cascades_to_its_events() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;

        let mut create = CreateEventUseCase {
            profile_id: profile.id.clone(),
            event_config_id: config.id.clone(),
            date: "2030-06-18".into(),
            time: None,
            notes: None,
        };
        let event = create.execute(&ctx).await.unwrap();

        let mut usecase = DeleteEventConfigUseCase {
            event_config_id: config.id.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();

        assert_eq!(res.config.id, config.id);
        assert_eq!(res.deleted_event_ids, vec![event.id.clone()]);
        assert!(ctx.repos.event_configs.find(&config.id).await.is_none());
        assert!(ctx.repos.events.find(&event.id).await.is_none());
    }
}
