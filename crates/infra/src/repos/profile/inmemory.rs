use super::IProfileRepo;
use crate::repos::shared::inmemory_repo::*;
use reward_scheduler_domain::{Profile, ID};
use std::sync::Mutex;

pub struct InMemoryProfileRepo {
    profiles: Mutex<Vec<Profile>>,
}

impl InMemoryProfileRepo {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryProfileRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IProfileRepo for InMemoryProfileRepo {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()> {
        insert(profile, &self.profiles);
        Ok(())
    }

    async fn save(&self, profile: &Profile) -> anyhow::Result<()> {
        save(profile, &self.profiles);
        Ok(())
    }

    async fn find(&self, profile_id: &ID) -> Option<Profile> {
        find(profile_id, &self.profiles)
    }

    async fn find_active(&self) -> Vec<Profile> {
        find_by(&self.profiles, |profile: &Profile| profile.active)
    }
}
