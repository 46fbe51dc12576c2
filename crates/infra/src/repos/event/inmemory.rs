use super::{EventStoreError, IEventRepo};
use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
use reward_scheduler_domain::{RewardEvent, ID};
use std::sync::Mutex;

pub struct InMemoryEventRepo {
    events: Mutex<Vec<RewardEvent>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryEventRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn active_upcoming_conflict<'a>(
    events: &'a [RewardEvent],
    candidate: &RewardEvent,
    now: DateTime<Utc>,
) -> Option<&'a RewardEvent> {
    if !candidate.is_active_upcoming(now) {
        return None;
    }
    events
        .iter()
        .filter(|other| {
            other.id != candidate.id
                && other.profile_id == candidate.profile_id
                && other.event_config_id == candidate.event_config_id
                && other.is_active_upcoming(now)
        })
        .min_by_key(|other| other.scheduled_at)
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, e: &RewardEvent) -> Result<(), EventStoreError> {
        let mut events = self.events.lock().unwrap();
        // Unique-constraint analog: check and insert under the same lock.
        if let Some(existing) = active_upcoming_conflict(&events, e, Utc::now()) {
            return Err(EventStoreError::DuplicateActiveUpcoming {
                event_config_id: e.event_config_id.clone(),
                existing_event_id: existing.id.clone(),
            });
        }
        events.push(e.clone());
        Ok(())
    }

    async fn save(&self, e: &RewardEvent) -> Result<(), EventStoreError> {
        let mut events = self.events.lock().unwrap();
        if let Some(existing) = active_upcoming_conflict(&events, e, Utc::now()) {
            return Err(EventStoreError::DuplicateActiveUpcoming {
                event_config_id: e.event_config_id.clone(),
                existing_event_id: existing.id.clone(),
            });
        }
        for event in events.iter_mut() {
            if event.id == e.id {
                *event = e.clone();
            }
        }
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<RewardEvent> {
        let events = self.events.lock().unwrap();
        events.iter().find(|e| e.id == *event_id).cloned()
    }

    async fn find_active_upcoming(
        &self,
        profile_id: &ID,
        event_config_id: &ID,
        now: DateTime<Utc>,
        exclude_event_id: Option<&ID>,
    ) -> Option<RewardEvent> {
        let events = self.events.lock().unwrap();
        events
            .iter()
            .filter(|e| {
                e.profile_id == *profile_id
                    && e.event_config_id == *event_config_id
                    && e.is_active_upcoming(now)
                    && exclude_event_id.map(|id| e.id != *id).unwrap_or(true)
            })
            .min_by_key(|e| e.scheduled_at)
            .cloned()
    }

    async fn find_recent_by_event_config(
        &self,
        profile_id: &ID,
        event_config_id: &ID,
        limit: usize,
    ) -> Vec<RewardEvent> {
        let events = self.events.lock().unwrap();
        let mut history = events
            .iter()
            .filter(|e| e.profile_id == *profile_id && e.event_config_id == *event_config_id)
            .cloned()
            .collect::<Vec<_>>();
        history.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        history.truncate(limit);
        history
    }

    async fn find_by_profile(
        &self,
        profile_id: &ID,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Vec<RewardEvent> {
        let events = self.events.lock().unwrap();
        let mut matches = events
            .iter()
            .filter(|e| {
                e.profile_id == *profile_id
                    && from.map(|from| e.scheduled_at >= from).unwrap_or(true)
                    && to.map(|to| e.scheduled_at <= to).unwrap_or(true)
            })
            .cloned()
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        matches.truncate(limit);
        matches
    }

    async fn delete(&self, event_id: &ID) -> Option<RewardEvent> {
        let mut events = self.events.lock().unwrap();
        let index = events.iter().position(|e| e.id == *event_id)?;
        Some(events.remove(index))
    }

    async fn delete_by_event_config(&self, event_config_id: &ID) -> DeleteResult {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.event_config_id != *event_config_id);
        DeleteResult {
            deleted_count: (before - events.len()) as i64,
        }
    }
}
