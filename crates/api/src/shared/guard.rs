use chrono::{DateTime, Utc};
use reward_scheduler_domain::{EventStatus, ACTIVE_UPCOMING_STATUSES, ID};
use reward_scheduler_infra::Context;

/// Why a candidate event cannot become active upcoming: another event for
/// the same (profile, event config) pair already is.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingConflict {
    pub event_config_id: ID,
    pub blocking_event_id: ID,
}

/// Checks the one-active-upcoming-event invariant before a mutation is
/// persisted. A no-op unless the candidate would itself be active
/// upcoming (status SCHEDULED or RESCHEDULED and a future `scheduled_at`).
/// When editing an existing event, pass its id so it does not conflict
/// with itself.
///
/// This is a check-then-act guard and can race with a concurrent
/// mutation; the event store enforces the same invariant atomically as a
/// backstop.
pub async fn assert_upcoming_unique(
    ctx: &Context,
    profile_id: &ID,
    event_config_id: &ID,
    candidate_status: EventStatus,
    candidate_scheduled_at: DateTime<Utc>,
    exclude_event_id: Option<&ID>,
    now: DateTime<Utc>,
) -> Result<(), UpcomingConflict> {
    if !ACTIVE_UPCOMING_STATUSES.contains(&candidate_status) || candidate_scheduled_at <= now {
        return Ok(());
    }

    match ctx
        .repos
        .events
        .find_active_upcoming(profile_id, event_config_id, now, exclude_event_id)
        .await
    {
        Some(blocking) => Err(UpcomingConflict {
            event_config_id: event_config_id.clone(),
            blocking_event_id: blocking.id,
        }),
        None => Ok(()),
    }
}
