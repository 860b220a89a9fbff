//! Session-bound participant resolution.

use crate::models::{ClientInfo, Participant, Progress};
use crate::services::Database;
use crate::study::{Screen, StudyGraph};
use service_core::error::AppError;
use tower_sessions::Session;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Session key holding the participant's UUID.
pub const PARTICIPANT_SESSION_KEY: &str = "participant_id";

/// Return the session's participant, creating one if the session has none,
/// names a row that no longer exists, or `force_new` is set.
#[instrument(skip(db, session, client))]
pub async fn resolve_participant(
    db: &Database,
    session: &Session,
    client: &ClientInfo,
    force_new: bool,
) -> Result<Participant, AppError> {
    if !force_new {
        let stored: Option<String> = session.get(PARTICIPANT_SESSION_KEY).await?;
        if let Some(id) = stored.as_deref().and_then(|s| Uuid::parse_str(s).ok()) {
            if let Some(participant) = db.get_participant(id).await? {
                return Ok(participant);
            }
            warn!(participant_id = %id, "Session references unknown participant; creating a new one");
        }
    }

    let participant = db
        .create_participant(client.user_agent.as_deref(), client.ip_address.as_deref())
        .await?;
    session
        .insert(PARTICIPANT_SESSION_KEY, participant.participant_id.to_string())
        .await?;

    Ok(participant)
}

/// Load the participant's progress and the screen it points at. A stored key
/// that the study no longer defines is reset to the first screen.
#[instrument(skip(db, graph, participant), fields(participant_id = %participant.participant_id))]
pub async fn current_screen(
    db: &Database,
    graph: &StudyGraph,
    participant: &Participant,
) -> Result<(Progress, &'static Screen), AppError> {
    let first_key = graph.first_screen_key();
    let mut progress = db
        .get_or_create_progress(participant.participant_id, first_key)
        .await?;

    if let Some(screen) = graph.screen(&progress.current_screen_key) {
        return Ok((progress, screen));
    }

    warn!(
        stale_key = %progress.current_screen_key,
        "Progress points at an unknown screen; resetting to the first screen"
    );
    db.set_current_screen(participant.participant_id, first_key)
        .await?;
    progress.current_screen_key = first_key.to_string();

    let screen = graph.screen(first_key).ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("First screen '{}' is not defined", first_key))
    })?;
    Ok((progress, screen))
}
