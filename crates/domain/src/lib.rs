mod event;
mod event_config;
mod profile;
mod recovery;
mod schedule;
mod shared;

pub use event::{
    Adjustment, EventStatus, RewardEvent, SentimentLevel, ACTIVE_UPCOMING_STATUSES,
};
pub use event_config::{normalize_slug, EventConfig};
pub use profile::Profile;
pub use recovery::{MissedRecoveryOption, RecoveryOptionKind};
pub use schedule::{
    local_date_of, local_to_utc, parse_local_time, resolve_scheduled_at, weekday_number,
    AllowedWindow, BlackoutDate, ResolvedSchedule, ScheduleSettings, ScheduleSettingsError,
};
pub use shared::entity::{Entity, ID};
