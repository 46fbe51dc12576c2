use chrono::Utc;
use reward_scheduler_domain::{EventConfig, Profile, ScheduleSettings};
use reward_scheduler_infra::{setup_context, Context};

pub struct TestContext {
    pub ctx: Context,
    pub profile: Profile,
    pub config: EventConfig,
    pub settings: ScheduleSettings,
}

/// One active profile with default settings and a single enabled
/// "flowers" event config.
pub async fn setup() -> TestContext {
    let ctx = setup_context().await;
    let now = Utc::now();

    let profile = Profile::new("cool profile", now);
    ctx.repos.profiles.insert(&profile).await.unwrap();

    let settings = ScheduleSettings::default_for_profile(profile.id.clone(), now);
    ctx.repos.schedule_settings.upsert(&settings).await.unwrap();

    let config = EventConfig::new(profile.id.clone(), "flowers", 14, 0.25, now);
    ctx.repos.event_configs.insert(&config).await.unwrap();

    TestContext {
        ctx,
        profile,
        config,
        settings,
    }
}
