use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored answer to one question. Unique per (participant, screen, question).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub participant_id: Uuid,
    pub screen_key: String,
    pub question_id: String,
    pub value: Json<serde_json::Value>,
    pub created_utc: DateTime<Utc>,
    pub modified_utc: DateTime<Utc>,
}
