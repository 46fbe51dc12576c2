mod inmemory;

pub use inmemory::InMemoryIdempotencyRepo;

use chrono::{DateTime, Utc};

/// Persisted send-side dedup keys for the reminder consumer. The
/// coordinator's cancellation is best-effort, so a reminder job may still
/// fire after a reschedule; recording `"{event_id}:{reminder_at}"` here
/// caps the system at one effective send per reminder instant.
#[derive(Debug, Clone)]
pub struct IdempotencyKey {
    pub key: String,
    pub kind: String,
    pub created: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait IIdempotencyRepo: Send + Sync {
    async fn insert(&self, key: &IdempotencyKey) -> anyhow::Result<()>;
    async fn exists(&self, key: &str) -> bool;
}
