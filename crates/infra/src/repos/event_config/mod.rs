mod inmemory;

pub use inmemory::InMemoryEventConfigRepo;

use reward_scheduler_domain::{EventConfig, ID};

#[async_trait::async_trait]
pub trait IEventConfigRepo: Send + Sync {
    async fn insert(&self, config: &EventConfig) -> anyhow::Result<()>;
    async fn save(&self, config: &EventConfig) -> anyhow::Result<()>;
    async fn find(&self, config_id: &ID) -> Option<EventConfig>;
    async fn find_by_profile(&self, profile_id: &ID) -> Vec<EventConfig>;
    async fn find_by_slug(&self, profile_id: &ID, slug: &str) -> Option<EventConfig>;
    /// Enabled configs for the generator sweep. Legacy data can contain
    /// slug collisions from the pre-migration dual-identifier era, so
    /// this normalizes to one representative per slug at the data-access
    /// boundary, newest-created wins.
    async fn find_enabled_deduped(&self, profile_id: &ID) -> Vec<EventConfig>;
    async fn delete(&self, config_id: &ID) -> Option<EventConfig>;
}
