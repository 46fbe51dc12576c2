use super::subscribers::NudgeGenerationOnSettingsChanged;
use crate::error::ApiError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use reward_scheduler_domain::{
    AllowedWindow, BlackoutDate, ScheduleSettings, ScheduleSettingsError, ID,
};
use reward_scheduler_infra::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub profile_id: ID,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub timezone: Option<String>,
    pub reminder_lead_hours: Option<i64>,
    pub min_gap_hours: Option<i64>,
    pub allowed_windows: Option<Vec<AllowedWindow>>,
    pub recurring_blackout_weekdays: Option<Vec<u8>>,
    pub blackout_dates: Option<Vec<BlackoutDate>>,
}

pub async fn set_settings_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let usecase = SetSettingsUseCase {
        profile_id: path_params.profile_id.clone(),
        timezone: body.timezone,
        reminder_lead_hours: body.reminder_lead_hours,
        min_gap_hours: body.min_gap_hours,
        allowed_windows: body.allowed_windows,
        recurring_blackout_weekdays: body.recurring_blackout_weekdays,
        blackout_dates: body.blackout_dates,
    };

    execute(usecase, &ctx)
        .await
        .map(|settings| HttpResponse::Ok().json(settings))
        .map_err(|e| match e {
            UseCaseErrors::ProfileNotFound(profile_id) => ApiError::NotFound(format!(
                "The profile with id: {}, was not found.",
                profile_id
            )),
            UseCaseErrors::InvalidWeekday(weekday) => ApiError::BadClientData(format!(
                "Weekdays are numbered 0 (Sunday) through 6 (Saturday), got: {}",
                weekday
            )),
            UseCaseErrors::Unschedulable(e) => ApiError::BadClientData(e.to_string()),
            UseCaseErrors::StorageError => ApiError::InternalError,
        })
}

/// Patch-style upsert of the per-profile scheduling preferences, rejected
/// when the result could never place an event.
#[derive(Debug)]
pub struct SetSettingsUseCase {
    pub profile_id: ID,
    pub timezone: Option<String>,
    pub reminder_lead_hours: Option<i64>,
    pub min_gap_hours: Option<i64>,
    pub allowed_windows: Option<Vec<AllowedWindow>>,
    pub recurring_blackout_weekdays: Option<Vec<u8>>,
    pub blackout_dates: Option<Vec<BlackoutDate>>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    ProfileNotFound(ID),
    InvalidWeekday(u8),
    Unschedulable(ScheduleSettingsError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetSettingsUseCase {
    type Response = ScheduleSettings;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_utc_now();

        if ctx.repos.profiles.find(&self.profile_id).await.is_none() {
            return Err(UseCaseErrors::ProfileNotFound(self.profile_id.clone()));
        }

        let mut settings = ctx
            .repos
            .schedule_settings
            .find_by_profile(&self.profile_id)
            .await
            .unwrap_or_else(|| ScheduleSettings::default_for_profile(self.profile_id.clone(), now));

        if let Some(timezone) = &self.timezone {
            settings.timezone = timezone.clone();
        }
        if let Some(lead) = self.reminder_lead_hours {
            settings.reminder_lead_hours = lead;
        }
        if let Some(gap) = self.min_gap_hours {
            settings.min_gap_hours = gap;
        }
        if let Some(windows) = &self.allowed_windows {
            for window in windows {
                if window.weekday > 6 {
                    return Err(UseCaseErrors::InvalidWeekday(window.weekday));
                }
            }
            settings.allowed_windows = windows.clone();
        }
        if let Some(weekdays) = &self.recurring_blackout_weekdays {
            for weekday in weekdays {
                if *weekday > 6 {
                    return Err(UseCaseErrors::InvalidWeekday(*weekday));
                }
            }
            settings.recurring_blackout_weekdays = weekdays.clone();
        }
        if let Some(dates) = &self.blackout_dates {
            settings.blackout_dates = dates.clone();
        }

        settings.validate().map_err(UseCaseErrors::Unschedulable)?;
        settings.updated = now;

        if ctx.repos.schedule_settings.upsert(&settings).await.is_err() {
            return Err(UseCaseErrors::StorageError);
        }

        Ok(settings)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NudgeGenerationOnSettingsChanged)]
    }
}
