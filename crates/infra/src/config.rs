use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Base url for the external schedule recommendation service. When
    /// absent, the in-process seeded recommender is used instead.
    pub recommender_url: Option<String>,
    /// Upper bound in millis for a single recommender call
    pub recommender_timeout_millis: u64,
    /// How many broker jobs a single reminder cancellation pass may scan.
    /// Cancellation is best-effort, the send consumer re-validates
    /// eligibility for anything a bounded scan misses.
    pub reminder_cancel_scan_limit: usize,
    /// Seconds between background schedule generation passes
    pub generation_interval_secs: u64,
    /// Seconds between reminder delivery passes
    pub reminder_delivery_interval_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let recommender_url = match std::env::var("RECOMMENDER_SERVICE_URL") {
            Ok(url) => Some(url),
            Err(_) => {
                info!("Did not find RECOMMENDER_SERVICE_URL environment variable. Using the in-process seeded recommender.");
                None
            }
        };

        Self {
            port,
            recommender_url,
            recommender_timeout_millis: 5000,
            reminder_cancel_scan_limit: 1000,
            generation_interval_secs: 60 * 60 * 24,
            reminder_delivery_interval_secs: 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
