//! Append-only audit trail of what each participant saw and did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenEventType {
    Render,
    Submit,
    Advance,
}

impl ScreenEventType {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Submit => "submit",
            Self::Advance => "advance",
        }
    }
}

impl std::fmt::Display for ScreenEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScreenEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "render" => Ok(Self::Render),
            "submit" => Ok(Self::Submit),
            "advance" => Ok(Self::Advance),
            other => Err(format!("unknown screen event type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScreenEvent {
    pub event_id: i64,
    pub participant_id: Uuid,
    pub screen_key: String,
    pub event_type: String,
    pub timestamp_utc: DateTime<Utc>,
}

impl ScreenEvent {
    pub fn parsed_type(&self) -> Option<ScreenEventType> {
        self.event_type.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_through_text() {
        for ty in [
            ScreenEventType::Render,
            ScreenEventType::Submit,
            ScreenEventType::Advance,
        ] {
            assert_eq!(ty.as_str().parse::<ScreenEventType>(), Ok(ty));
        }
        assert!("viewed".parse::<ScreenEventType>().is_err());
    }
}
