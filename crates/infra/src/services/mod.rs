mod broker;
mod recommender;
mod reminders;

pub use broker::{IJobBroker, InMemoryJobBroker, JobState, QueuedJob};
pub use recommender::{
    EventConfigPayload, EventHistoryPayload, HttpRecommender, IRecommender, MissedOptionsRequest,
    RecommendNextRequest, RecommendNextResponse, SeededRecommender, SettingsPayload,
};
pub use reminders::{
    GenerationJobPayload, ReminderCoordinator, ReminderJobPayload, GENERATION_QUEUE,
    REMINDER_QUEUE,
};
