use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states for a `RewardEvent`.
///
/// `Scheduled` and `Rescheduled` are the "active upcoming" states when the
/// event is also in the future. `Completed` is terminal, `Missed` can move
/// to `Rescheduled` through the missed-recovery flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Scheduled,
    Completed,
    Missed,
    Rescheduled,
    Canceled,
}

pub const ACTIVE_UPCOMING_STATUSES: [EventStatus; 2] =
    [EventStatus::Scheduled, EventStatus::Rescheduled];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLevel {
    VeryPoor,
    Poor,
    Neutral,
    Well,
    VeryWell,
}

/// Immutable log entry recording a schedule change on a `RewardEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub from_at: DateTime<Utc>,
    pub to_at: DateTime<Utc>,
    pub reason: String,
    pub actor: String,
    pub adjusted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEvent {
    pub id: ID,
    pub profile_id: ID,
    pub event_config_id: ID,
    pub scheduled_at: DateTime<Utc>,
    /// Set once at creation and never touched again, no matter how many
    /// times the event gets rescheduled.
    pub original_scheduled_at: DateTime<Utc>,
    pub has_explicit_time: bool,
    pub status: EventStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub missed_at: Option<DateTime<Utc>>,
    pub sentiment_level: Option<SentimentLevel>,
    pub notes: Option<String>,
    pub adjustments: Vec<Adjustment>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity for RewardEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl RewardEvent {
    pub fn new(
        profile_id: ID,
        event_config_id: ID,
        scheduled_at: DateTime<Utc>,
        has_explicit_time: bool,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Default::default(),
            profile_id,
            event_config_id,
            scheduled_at,
            original_scheduled_at: scheduled_at,
            has_explicit_time,
            status: EventStatus::Scheduled,
            completed_at: None,
            missed_at: None,
            sentiment_level: None,
            notes,
            adjustments: Vec::new(),
            created: now,
            updated: now,
        }
    }

    pub fn is_active_upcoming(&self, now: DateTime<Utc>) -> bool {
        ACTIVE_UPCOMING_STATUSES.contains(&self.status) && self.scheduled_at > now
    }

    /// Moves `scheduled_at` without changing status and records the change
    /// in the adjustment log. Callers are responsible for requiring a
    /// non-empty reason and for running the uniqueness guard first.
    pub fn change_schedule(
        &mut self,
        new_scheduled_at: DateTime<Utc>,
        has_explicit_time: bool,
        reason: String,
        actor: String,
        now: DateTime<Utc>,
    ) {
        self.adjustments.push(Adjustment {
            from_at: self.scheduled_at,
            to_at: new_scheduled_at,
            reason,
            actor,
            adjusted_at: now,
        });
        self.scheduled_at = new_scheduled_at;
        self.has_explicit_time = has_explicit_time;
        self.updated = now;
    }

    pub fn complete(
        &mut self,
        sentiment_level: SentimentLevel,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = EventStatus::Completed;
        self.completed_at = Some(now);
        self.sentiment_level = Some(sentiment_level);
        if notes.is_some() {
            self.notes = notes;
        }
        self.updated = now;
    }

    /// Marks the event missed. A free-text reason is folded into the notes
    /// as a tagged suffix instead of becoming a structured field.
    pub fn miss(&mut self, reason: Option<String>, now: DateTime<Utc>) {
        self.status = EventStatus::Missed;
        self.missed_at = Some(now);
        if let Some(reason) = reason {
            let existing = self.notes.take().unwrap_or_default();
            self.notes = Some(
                format!("{}\n[Missed Reason] {}", existing, reason)
                    .trim()
                    .to_string(),
            );
        }
        self.updated = now;
    }

    /// Moves the event to `Rescheduled` regardless of prior status. Used
    /// both for manual reschedules and applied missed-recovery options.
    pub fn reschedule(
        &mut self,
        new_scheduled_at: DateTime<Utc>,
        has_explicit_time: bool,
        reason: String,
        actor: String,
        now: DateTime<Utc>,
    ) {
        self.change_schedule(new_scheduled_at, has_explicit_time, reason, actor, now);
        self.status = EventStatus::Rescheduled;
    }
}
