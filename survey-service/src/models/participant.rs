//! Participant and progress rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Anonymous survey taker, bound to one browser session.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: Uuid,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub modified_utc: DateTime<Utc>,
}

/// Where a participant currently is in the study. Exactly one per participant.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Progress {
    pub participant_id: Uuid,
    pub current_screen_key: String,
    pub created_utc: DateTime<Utc>,
    pub modified_utc: DateTime<Utc>,
}
