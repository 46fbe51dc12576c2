mod config;
mod repos;
mod services;
pub mod system;

pub use config::Config;
pub use repos::{
    DeleteResult, EventStoreError, IEventConfigRepo, IEventRepo, IIdempotencyRepo,
    IProfileRepo, IScheduleSettingsRepo, IdempotencyKey, Repos,
};
pub use services::{
    EventConfigPayload, EventHistoryPayload, GenerationJobPayload, HttpRecommender, IJobBroker,
    IRecommender, InMemoryJobBroker, JobState, MissedOptionsRequest, QueuedJob,
    RecommendNextRequest, RecommendNextResponse, ReminderCoordinator, ReminderJobPayload,
    SeededRecommender, SettingsPayload, GENERATION_QUEUE, REMINDER_QUEUE,
};
use std::sync::Arc;
use system::{ISys, RealSys};

#[derive(Clone)]
pub struct Context {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub recommender: Arc<dyn IRecommender>,
    pub reminders: Arc<ReminderCoordinator>,
}

/// Wires together the application context. Storage and the job broker
/// are in-memory; the recommender is the external http service when
/// `RECOMMENDER_SERVICE_URL` is set and the in-process seeded one
/// otherwise.
pub async fn setup_context() -> Context {
    let config = Config::new();

    let recommender: Arc<dyn IRecommender> = match &config.recommender_url {
        Some(url) => Arc::new(HttpRecommender::new(url, config.recommender_timeout_millis)),
        None => Arc::new(SeededRecommender),
    };

    let broker: Arc<dyn IJobBroker> = Arc::new(InMemoryJobBroker::new());
    let reminders = Arc::new(ReminderCoordinator::new(
        broker,
        config.reminder_cancel_scan_limit,
    ));

    Context {
        repos: Repos::create_inmemory(),
        config,
        sys: Arc::new(RealSys {}),
        recommender,
        reminders,
    }
}
