use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted user. `profile_summary` holds the latest profile analysis as JSON text,
/// overwritten on every successful analysis.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: String,
    pub avatar_url: String,
    pub profile_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Parsed summary; `None` when absent or not valid JSON.
    pub fn summary_json(&self) -> Option<serde_json::Value> {
        self.profile_summary
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
    }
}

/// Identity returned by the professional network after the OAuth exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub name: String,
    pub avatar_url: String,
}
