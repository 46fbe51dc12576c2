mod inmemory;

pub use inmemory::InMemoryEventRepo;

use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
use reward_scheduler_domain::{RewardEvent, ID};
use thiserror::Error;

/// Write errors for the event store. The duplicate variant is the
/// storage-level backstop for the active-upcoming uniqueness invariant:
/// the in-process guard is check-then-act and can race, so the store
/// itself must reject a second active upcoming event per
/// (profile, event config) pair.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("An active upcoming event already exists for event config: {event_config_id}")]
    DuplicateActiveUpcoming {
        event_config_id: ID,
        existing_event_id: ID,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, e: &RewardEvent) -> Result<(), EventStoreError>;
    async fn save(&self, e: &RewardEvent) -> Result<(), EventStoreError>;
    async fn find(&self, event_id: &ID) -> Option<RewardEvent>;
    /// Earliest-first lookup of an active upcoming event for the pair,
    /// optionally excluding one event id (used when editing in place).
    async fn find_active_upcoming(
        &self,
        profile_id: &ID,
        event_config_id: &ID,
        now: DateTime<Utc>,
        exclude_event_id: Option<&ID>,
    ) -> Option<RewardEvent>;
    /// History for an event config, newest `scheduled_at` first.
    async fn find_recent_by_event_config(
        &self,
        profile_id: &ID,
        event_config_id: &ID,
        limit: usize,
    ) -> Vec<RewardEvent>;
    async fn find_by_profile(
        &self,
        profile_id: &ID,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Vec<RewardEvent>;
    async fn delete(&self, event_id: &ID) -> Option<RewardEvent>;
    async fn delete_by_event_config(&self, event_config_id: &ID) -> DeleteResult;
}
