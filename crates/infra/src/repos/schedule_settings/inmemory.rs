use super::IScheduleSettingsRepo;
use reward_scheduler_domain::{ScheduleSettings, ID};
use std::sync::Mutex;

pub struct InMemoryScheduleSettingsRepo {
    settings: Mutex<Vec<ScheduleSettings>>,
}

impl InMemoryScheduleSettingsRepo {
    pub fn new() -> Self {
        Self {
            settings: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryScheduleSettingsRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IScheduleSettingsRepo for InMemoryScheduleSettingsRepo {
    async fn upsert(&self, settings: &ScheduleSettings) -> anyhow::Result<()> {
        let mut collection = self.settings.lock().unwrap();
        collection.retain(|s| s.profile_id != settings.profile_id);
        collection.push(settings.clone());
        Ok(())
    }

    async fn find_by_profile(&self, profile_id: &ID) -> Option<ScheduleSettings> {
        let collection = self.settings.lock().unwrap();
        collection
            .iter()
            .find(|s| s.profile_id == *profile_id)
            .cloned()
    }
}
