use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryOptionKind {
    Asap,
    Delayed,
}

impl std::fmt::Display for RecoveryOptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asap => write!(f, "ASAP"),
            Self::Delayed => write!(f, "DELAYED"),
        }
    }
}

/// A candidate replacement slot for a missed event. Options are ephemeral:
/// they are recomputed deterministically from the event id on every call
/// and never persisted, so an option id stays valid for as long as the
/// event remains in the missed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedRecoveryOption {
    pub option_id: String,
    #[serde(rename = "type")]
    pub kind: RecoveryOptionKind,
    pub proposed_at: DateTime<Utc>,
    pub rationale: String,
    pub recommended: bool,
}
