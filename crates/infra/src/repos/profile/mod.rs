mod inmemory;

pub use inmemory::InMemoryProfileRepo;

use reward_scheduler_domain::{Profile, ID};

#[async_trait::async_trait]
pub trait IProfileRepo: Send + Sync {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()>;
    async fn save(&self, profile: &Profile) -> anyhow::Result<()>;
    async fn find(&self, profile_id: &ID) -> Option<Profile>;
    async fn find_active(&self) -> Vec<Profile>;
}
