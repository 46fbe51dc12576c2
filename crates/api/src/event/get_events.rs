use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use reward_scheduler_domain::{RewardEvent, ID};
use reward_scheduler_infra::Context;
use serde::Deserialize;

const MAX_EVENTS_PER_PAGE: usize = 200;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub profile_id: ID,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

pub async fn get_events_controller(
    path_params: web::Path<PathParams>,
    query: web::Query<QueryParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let usecase = GetEventsUseCase {
        profile_id: path_params.profile_id.clone(),
        from: query.from,
        to: query.to,
        limit: query.limit.unwrap_or(MAX_EVENTS_PER_PAGE),
    };

    execute(usecase, &ctx)
        .await
        .map(|events| HttpResponse::Ok().json(events))
        .map_err(|e| match e {
            UseCaseErrors::NotFound(profile_id) => ApiError::NotFound(format!(
                "The profile with id: {}, was not found.",
                profile_id
            )),
            UseCaseErrors::InvalidRange => {
                ApiError::BadClientData("The `from` bound must not be after `to`".into())
            }
        })
}

#[derive(Debug)]
pub struct GetEventsUseCase {
    pub profile_id: ID,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: usize,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    InvalidRange,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventsUseCase {
    type Response = Vec<RewardEvent>;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        if ctx.repos.profiles.find(&self.profile_id).await.is_none() {
            return Err(UseCaseErrors::NotFound(self.profile_id.clone()));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(UseCaseErrors::InvalidRange);
            }
        }

        let limit = self.limit.min(MAX_EVENTS_PER_PAGE);
        Ok(ctx
            .repos
            .events
            .find_by_profile(&self.profile_id, self.from, self.to, limit)
            .await)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_helpers::{setup, TestContext};
    use chrono::Duration;
    use reward_scheduler_domain::RewardEvent;

    #[actix_web::main]
    #[test]
    async fn lists_profile_events_within_range() {
        let TestContext {
            ctx,
            profile,
            config,
            ..
        } = setup().await;
        let now = Utc::now();

        for offset in 0..3 {
            // Spread completed events so they never trip the
            // active-upcoming constraint.
            let mut event = RewardEvent::new(
                profile.id.clone(),
                config.id.clone(),
                now - Duration::days(10 - offset),
                false,
                None,
                now,
            );
            event.status = reward_scheduler_domain::EventStatus::Completed;
            ctx.repos.events.insert(&event).await.unwrap();
        }

        let mut usecase = GetEventsUseCase {
            profile_id: profile.id.clone(),
            from: Some(now - Duration::days(9) - Duration::hours(1)),
            to: None,
            limit: 100,
        };
        let events = usecase.execute(&ctx).await.unwrap();
        assert_eq!(events.len(), 2);
        // Newest first
        assert!(events[0].scheduled_at > events[1].scheduled_at);

        let mut usecase = GetEventsUseCase {
            profile_id: profile.id.clone(),
            from: Some(now),
            to: Some(now - Duration::days(1)),
            limit: 100,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidRange)
        ));
    }
}
