use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A weekly window during which events may be scheduled.
/// Weekday numbering is 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedWindow {
    pub weekday: u8,
    pub start_local_time: String,
    pub end_local_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackoutDate {
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    pub note: Option<String>,
}

/// Per-profile scheduling preferences. One document per profile.
///
/// The timezone is an IANA name that is deliberately not validated for
/// existence: schedule arithmetic degrades to UTC when it cannot be
/// resolved instead of failing the mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    pub id: ID,
    pub profile_id: ID,
    pub timezone: String,
    pub reminder_lead_hours: i64,
    pub min_gap_hours: i64,
    pub allowed_windows: Vec<AllowedWindow>,
    pub recurring_blackout_weekdays: Vec<u8>,
    pub blackout_dates: Vec<BlackoutDate>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity for ScheduleSettings {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ScheduleSettingsError {
    #[error("Schedule settings block all weekdays")]
    AllWeekdaysBlackedOut,
    #[error("Allowed windows all fall on recurring blackout weekdays")]
    WindowsAllBlackedOut,
    #[error("Reminder lead hours must be between 1 and 168")]
    InvalidReminderLeadHours,
    #[error("Minimum gap hours must be between 1 and 720")]
    InvalidMinGapHours,
}

impl ScheduleSettings {
    pub fn default_for_profile(profile_id: ID, now: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            profile_id,
            timezone: "UTC".into(),
            reminder_lead_hours: 24,
            min_gap_hours: 24,
            allowed_windows: Vec::new(),
            recurring_blackout_weekdays: Vec::new(),
            blackout_dates: Vec::new(),
            created: now,
            updated: now,
        }
    }

    /// Rejects settings under which the generator could never place an
    /// event: all seven weekdays blacked out, or every allowed window
    /// falling on a blacked-out weekday.
    pub fn validate(&self) -> Result<(), ScheduleSettingsError> {
        if !(1..=168).contains(&self.reminder_lead_hours) {
            return Err(ScheduleSettingsError::InvalidReminderLeadHours);
        }
        if !(1..=720).contains(&self.min_gap_hours) {
            return Err(ScheduleSettingsError::InvalidMinGapHours);
        }

        let recurring: HashSet<u8> = self
            .recurring_blackout_weekdays
            .iter()
            .copied()
            .collect();
        if recurring.len() >= 7 {
            return Err(ScheduleSettingsError::AllWeekdaysBlackedOut);
        }

        if !self.allowed_windows.is_empty()
            && !self
                .allowed_windows
                .iter()
                .any(|window| !recurring.contains(&window.weekday))
        {
            return Err(ScheduleSettingsError::WindowsAllBlackedOut);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSchedule {
    pub scheduled_at: DateTime<Utc>,
    pub has_explicit_time: bool,
}

const DEFAULT_LOCAL_TIME: &str = "09:00";

/// Resolves a local date and optional local time to an absolute UTC
/// instant. This path never fails: bad timezone names degrade to treating
/// the wall clock as UTC and unparsable window times fall back to 09:00.
///
/// Without an explicit time, the earliest allowed window matching the
/// date's weekday decides the local time, defaulting to 09:00 local when
/// no window matches.
pub fn resolve_scheduled_at(
    date: NaiveDate,
    time: Option<NaiveTime>,
    timezone: &str,
    allowed_windows: &[AllowedWindow],
) -> ResolvedSchedule {
    let (local_time, has_explicit_time) = match time {
        Some(time) => (time, true),
        None => {
            let weekday = weekday_number(date);
            let mut starts = allowed_windows
                .iter()
                .filter(|window| window.weekday == weekday)
                .map(|window| parse_local_time(&window.start_local_time))
                .collect::<Vec<_>>();
            starts.sort();
            (
                starts
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| parse_local_time(DEFAULT_LOCAL_TIME)),
                false,
            )
        }
    };

    ResolvedSchedule {
        scheduled_at: local_to_utc(date.and_time(local_time), timezone),
        has_explicit_time,
    }
}

/// Weekday as 0 = Sunday .. 6 = Saturday. The calendar date alone decides
/// the weekday, which matches an anchor at local midday and avoids DST
/// edge flips.
pub fn weekday_number(date: NaiveDate) -> u8 {
    use chrono::Datelike;
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

pub fn parse_local_time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M")
        .unwrap_or_else(|_| NaiveTime::from_hms(9, 0, 0))
}

/// Converts a local wall-clock datetime in the given IANA timezone to UTC.
/// Unknown timezones and DST gaps fall back to reading the wall clock as
/// UTC so scheduling never hard-fails on a bad timezone string.
pub fn local_to_utc(local: chrono::NaiveDateTime, timezone: &str) -> DateTime<Utc> {
    match timezone.parse::<Tz>() {
        Ok(tz) => match tz.from_local_datetime(&local).earliest() {
            Some(zoned) => zoned.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&local),
        },
        Err(_) => Utc.from_utc_datetime(&local),
    }
}

/// Projects a stored UTC instant back to its local calendar date, used
/// when patching only the time of an existing event. Falls back to the
/// UTC date when the timezone cannot be resolved.
pub fn local_date_of(instant: DateTime<Utc>, timezone: &str) -> NaiveDate {
    match timezone.parse::<Tz>() {
        Ok(tz) => instant.with_timezone(&tz).naive_local().date(),
        Err(_) => instant.naive_utc().date(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn window(weekday: u8, start: &str) -> AllowedWindow {
        AllowedWindow {
            weekday,
            start_local_time: start.into(),
            end_local_time: "21:00".into(),
        }
    }

    #[test]
    fn explicit_time_converts_from_local_timezone() {
        // 2021-06-15 is a Tuesday; New York is UTC-4 in June.
        let resolved = resolve_scheduled_at(
            NaiveDate::from_ymd(2021, 6, 15),
            Some(NaiveTime::from_hms(18, 30, 0)),
            "America/New_York",
            &[],
        );

        assert!(resolved.has_explicit_time);
        assert_eq!(
            resolved.scheduled_at,
            Utc.ymd(2021, 6, 15).and_hms(22, 30, 0)
        );
    }

    #[test]
    fn date_only_takes_earliest_matching_window() {
        let windows = vec![
            window(2, "17:00"),
            window(2, "08:30"),
            window(3, "07:00"),
        ];

        let resolved = resolve_scheduled_at(
            NaiveDate::from_ymd(2021, 6, 15),
            None,
            "UTC",
            &windows,
        );

        assert!(!resolved.has_explicit_time);
        assert_eq!(resolved.scheduled_at, Utc.ymd(2021, 6, 15).and_hms(8, 30, 0));
    }

    #[test]
    fn date_only_without_matching_window_defaults_to_nine_local() {
        let windows = vec![window(3, "07:00")];

        let resolved = resolve_scheduled_at(
            NaiveDate::from_ymd(2021, 6, 15),
            None,
            "Europe/Oslo",
            &windows,
        );

        assert!(!resolved.has_explicit_time);
        // 09:00 Oslo summer time is 07:00 UTC.
        assert_eq!(resolved.scheduled_at, Utc.ymd(2021, 6, 15).and_hms(7, 0, 0));
    }

    #[test]
    fn unknown_timezone_degrades_to_utc_wall_clock() {
        let resolved = resolve_scheduled_at(
            NaiveDate::from_ymd(2021, 6, 15),
            Some(NaiveTime::from_hms(18, 30, 0)),
            "Not/AZone",
            &[],
        );

        assert_eq!(
            resolved.scheduled_at,
            Utc.ymd(2021, 6, 15).and_hms(18, 30, 0)
        );
    }

    #[test]
    fn weekday_numbering_starts_at_sunday() {
        assert_eq!(weekday_number(NaiveDate::from_ymd(2021, 6, 13)), 0); // Sunday
        assert_eq!(weekday_number(NaiveDate::from_ymd(2021, 6, 19)), 6); // Saturday
    }

    #[test]
    fn local_date_projection_uses_timezone() {
        // 01:30 UTC on the 16th is still the 15th in New York.
        let instant = Utc.ymd(2021, 6, 16).and_hms(1, 30, 0);
        assert_eq!(
            local_date_of(instant, "America/New_York"),
            NaiveDate::from_ymd(2021, 6, 15)
        );
        assert_eq!(
            local_date_of(instant, "Not/AZone"),
            NaiveDate::from_ymd(2021, 6, 16)
        );
    }

    #[test]
    fn settings_validation_rejects_unschedulable_configs() {
        let now = Utc.ymd(2021, 3, 1).and_hms(0, 0, 0);
        let mut settings = ScheduleSettings::default_for_profile(Default::default(), now);

        settings.recurring_blackout_weekdays = (0..7).collect();
        assert_eq!(
            settings.validate(),
            Err(ScheduleSettingsError::AllWeekdaysBlackedOut)
        );

        settings.recurring_blackout_weekdays = vec![1, 2];
        settings.allowed_windows = vec![window(1, "09:00"), window(2, "09:00")];
        assert_eq!(
            settings.validate(),
            Err(ScheduleSettingsError::WindowsAllBlackedOut)
        );

        settings.allowed_windows.push(window(5, "09:00"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_validation_checks_hour_ranges() {
        let now = Utc.ymd(2021, 3, 1).and_hms(0, 0, 0);
        let mut settings = ScheduleSettings::default_for_profile(Default::default(), now);

        settings.reminder_lead_hours = 0;
        assert_eq!(
            settings.validate(),
            Err(ScheduleSettingsError::InvalidReminderLeadHours)
        );

        settings.reminder_lead_hours = 24;
        settings.min_gap_hours = 721;
        assert_eq!(
            settings.validate(),
            Err(ScheduleSettingsError::InvalidMinGapHours)
        );
    }
}
