use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named recurring reward definition owned by a profile, e.g. "flowers
/// every ~14 days". The concrete next occurrence is computed by the
/// external recommender from `base_interval_days` and `jitter_pct`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConfig {
    pub id: ID,
    pub profile_id: ID,
    pub name: String,
    /// Lowercase url-safe identifier, unique per profile.
    pub slug: String,
    pub base_interval_days: u32,
    pub jitter_pct: f64,
    pub enabled: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity for EventConfig {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl EventConfig {
    pub fn new(
        profile_id: ID,
        name: &str,
        base_interval_days: u32,
        jitter_pct: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Default::default(),
            profile_id,
            name: name.trim().to_string(),
            slug: normalize_slug(name),
            base_interval_days,
            jitter_pct,
            enabled: true,
            created: now,
            updated: now,
        }
    }

    /// Event configs every new profile starts out with.
    pub fn defaults_for_profile(profile_id: &ID, now: DateTime<Utc>) -> Vec<Self> {
        vec![
            Self::new(profile_id.clone(), "flowers", 14, 0.25, now),
            Self::new(profile_id.clone(), "nice_date", 10, 0.2, now),
            Self::new(profile_id.clone(), "activity", 7, 0.2, now),
            Self::new(profile_id.clone(), "thoughtful_message", 4, 0.15, now),
        ]
    }
}

/// Trim, lowercase and collapse every non-alphanumeric run to a single
/// dash, dropping leading and trailing dashes.
pub fn normalize_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalizes_slugs() {
        assert_eq!(normalize_slug("Nice Date"), "nice-date");
        assert_eq!(normalize_slug("  Flowers!  "), "flowers");
        assert_eq!(normalize_slug("a--b__c"), "a-b-c");
        assert_eq!(normalize_slug("--"), "");
        assert_eq!(normalize_slug("thoughtful_message"), "thoughtful-message");
    }

    #[test]
    fn default_configs_are_enabled_and_owned() {
        let profile_id = ID::new();
        let now = Utc.ymd(2021, 3, 1).and_hms(12, 0, 0);
        let configs = EventConfig::defaults_for_profile(&profile_id, now);

        assert_eq!(configs.len(), 4);
        for config in &configs {
            assert!(config.enabled);
            assert_eq!(config.profile_id, profile_id);
            assert_eq!(config.slug, normalize_slug(&config.name));
        }
    }
}
