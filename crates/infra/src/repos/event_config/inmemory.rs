use super::IEventConfigRepo;
use crate::repos::shared::inmemory_repo::*;
use reward_scheduler_domain::{EventConfig, ID};
use std::collections::HashSet;
use std::sync::Mutex;

pub struct InMemoryEventConfigRepo {
    configs: Mutex<Vec<EventConfig>>,
}

impl InMemoryEventConfigRepo {
    pub fn new() -> Self {
        Self {
            configs: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryEventConfigRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEventConfigRepo for InMemoryEventConfigRepo {
    async fn insert(&self, config: &EventConfig) -> anyhow::Result<()> {
        insert(config, &self.configs);
        Ok(())
    }

    async fn save(&self, config: &EventConfig) -> anyhow::Result<()> {
        save(config, &self.configs);
        Ok(())
    }

    async fn find(&self, config_id: &ID) -> Option<EventConfig> {
        find(config_id, &self.configs)
    }

    async fn find_by_profile(&self, profile_id: &ID) -> Vec<EventConfig> {
        let mut configs = find_by(&self.configs, |config: &EventConfig| {
            config.profile_id == *profile_id
        });
        configs.sort_by(|a, b| b.created.cmp(&a.created));
        configs
    }

    async fn find_by_slug(&self, profile_id: &ID, slug: &str) -> Option<EventConfig> {
        find_by(&self.configs, |config: &EventConfig| {
            config.profile_id == *profile_id && config.slug == slug
        })
        .into_iter()
        .next()
    }

    async fn find_enabled_deduped(&self, profile_id: &ID) -> Vec<EventConfig> {
        let mut configs = find_by(&self.configs, |config: &EventConfig| {
            config.profile_id == *profile_id && config.enabled
        });
        // Newest-created first, then keep the first occurrence per slug.
        configs.sort_by(|a, b| b.created.cmp(&a.created));
        let mut seen = HashSet::new();
        configs.retain(|config| seen.insert(config.slug.clone()));
        configs
    }

    async fn delete(&self, config_id: &ID) -> Option<EventConfig> {
        delete(config_id, &self.configs)
    }
}
