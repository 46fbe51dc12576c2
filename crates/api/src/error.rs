use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use reward_scheduler_domain::ID;
use serde_json::json;
use thiserror::Error;

pub const CONFLICT_UPCOMING_EXISTS: &str = "EVENT_CONFIG_UPCOMING_EXISTS";
pub const CONFLICT_SLUG_EXISTS: &str = "EVENT_CONFIG_SLUG_EXISTS";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("There was a conflict with the request. Error message: `{message}`")]
    Conflict {
        code: &'static str,
        message: String,
        blocking_event_id: Option<ID>,
    },
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
    #[error("Upstream service failure. Error message: `{0}`")]
    Upstream(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::InternalError => "INTERNAL_ERROR",
            Self::BadClientData(_) => "VALIDATION_ERROR",
            Self::Conflict { code, .. } => code,
            Self::NotFound(_) => "NOT_FOUND",
            Self::Upstream(_) => "UPSTREAM_ERROR",
        }
    }
}

impl actix_web::error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Self::Conflict {
            blocking_event_id: Some(event_id),
            ..
        } = self
        {
            body["blockingEventId"] = json!(event_id.to_string());
        }

        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "application/json; charset=utf-8"))
            .body(body.to_string())
    }
}
