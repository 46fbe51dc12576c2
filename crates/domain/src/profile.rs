use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The owner of event configs, schedule settings and events. Inactive
/// profiles are skipped by the background schedule generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ID,
    pub name: String,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity for Profile {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl Profile {
    pub fn new(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            name: name.trim().to_string(),
            active: true,
            created: now,
            updated: now,
        }
    }
}
