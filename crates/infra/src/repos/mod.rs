mod event;
mod event_config;
mod idempotency;
mod profile;
mod schedule_settings;
mod shared;

use event::InMemoryEventRepo;
use event_config::InMemoryEventConfigRepo;
use idempotency::InMemoryIdempotencyRepo;
use profile::InMemoryProfileRepo;
use schedule_settings::InMemoryScheduleSettingsRepo;
use std::sync::Arc;

pub use event::{EventStoreError, IEventRepo};
pub use event_config::IEventConfigRepo;
pub use idempotency::{IIdempotencyRepo, IdempotencyKey};
pub use profile::IProfileRepo;
pub use schedule_settings::IScheduleSettingsRepo;
pub use shared::repo::DeleteResult;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub event_configs: Arc<dyn IEventConfigRepo>,
    pub schedule_settings: Arc<dyn IScheduleSettingsRepo>,
    pub profiles: Arc<dyn IProfileRepo>,
    pub idempotency_keys: Arc<dyn IIdempotencyRepo>,
}

impl Repos {
    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            event_configs: Arc::new(InMemoryEventConfigRepo::new()),
            schedule_settings: Arc::new(InMemoryScheduleSettingsRepo::new()),
            profiles: Arc::new(InMemoryProfileRepo::new()),
            idempotency_keys: Arc::new(InMemoryIdempotencyRepo::new()),
        }
    }
}
