mod inmemory;

pub use inmemory::InMemoryScheduleSettingsRepo;

use reward_scheduler_domain::{ScheduleSettings, ID};

#[async_trait::async_trait]
pub trait IScheduleSettingsRepo: Send + Sync {
    /// Insert-or-replace keyed by profile id, there is one settings
    /// document per profile.
    async fn upsert(&self, settings: &ScheduleSettings) -> anyhow::Result<()>;
    async fn find_by_profile(&self, profile_id: &ID) -> Option<ScheduleSettings>;
}
