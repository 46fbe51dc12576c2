use super::recovery::{build_missed_options, RecoveryError};
use super::subscribers::{CancelReminderOnEventMissed, NudgeGenerationOnEventMissed};
use crate::error::ApiError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{EventStatus, MissedRecoveryOption, RewardEvent, ID};
use reward_scheduler_infra::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub event_id: ID,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedEventResponse {
    pub event: RewardEvent,
    pub options: Vec<MissedRecoveryOption>,
}

pub async fn miss_event_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = MissEventUseCase {
        event_id: path_params.event_id.clone(),
        reason: body.reason.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(res))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(event_id) => {
                ApiError::NotFound(format!("The event with id: {}, was not found.", event_id))
            }
            UseCaseErrors::InvalidStatus(status) => ApiError::BadClientData(format!(
                "An event with status: {:?} cannot be marked missed",
                status
            )),
            UseCaseErrors::RecommenderFailure(e) => ApiError::Upstream(e),
            UseCaseErrors::StorageError => ApiError::InternalError,
        })
}

/// Marks the event missed and immediately returns the deterministic
/// recovery options so a client can offer them in one round trip.
#[derive(Debug)]
pub struct MissEventUseCase {
    pub event_id: ID,
    pub reason: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    InvalidStatus(EventStatus),
    RecommenderFailure(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for MissEventUseCase {
    type Response = MissedEventResponse;

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
            EventStatus::Scheduled | EventStatus::Rescheduled => {}
            status => return Err(UseCaseErrors::InvalidStatus(status)),
        }

        event.miss(self.reason.clone(), now);
        if ctx.repos.events.save(&event).await.is_err() {
            return Err(UseCaseErrors::StorageError);
        }

        let options = match build_missed_options(&event, ctx).await {
            Ok(options) => options,
            Err(RecoveryError::ConfigMissing(id)) => {
                return Err(UseCaseErrors::RecommenderFailure(format!(
                    "Event config {} is gone",
                    id
                )))
            }
            Err(RecoveryError::Upstream(e)) => return Err(UseCaseErrors::RecommenderFailure(e)),
        };

        Ok(MissedEventResponse { event, options })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(CancelReminderOnEventMissed),
            Box::new(NudgeGenerationOnEventMissed),
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
    async fn miss_folds_reason_into_notes_and_returns_options() {
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
            notes: Some("bring tulips".into()),
        };
        let event = create.execute(&ctx).await.unwrap();

        let mut usecase = MissEventUseCase {
            event_id: event.id.clone(),
            reason: Some("was travelling".into()),
        };
        let res = usecase.execute(&ctx).await.unwrap();

        assert_eq!(res.event.status, EventStatus::Missed);
        assert!(res.event.missed_at.is_some());
        assert_eq!(
            res.event.notes.as_deref(),
            Some("bring tulips\n[Missed Reason] was travelling")
        );
        assert_eq!(res.options.len(), 2);
        assert!(res.options.iter().any(|o| o.recommended));
    }

    #[actix_web::main]
    #[test]
    async fn cannot_miss_a_completed_event() {
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
        let mut event = create.execute(&ctx).await.unwrap();
        event.complete(
            reward_scheduler_domain::SentimentLevel::Well,
            None,
            chrono::Utc::now(),
        );
        ctx.repos.events.save(&event).await.unwrap();

        let mut usecase = MissEventUseCase {
            event_id: event.id.clone(),
            reason: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidStatus(EventStatus::Completed))
        ));
    }
}
