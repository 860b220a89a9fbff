//! The three survey endpoints: full page, screen fragment, answer submission.

use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::flow::{validate_answers, ScreenView};
use crate::models::{ClientInfo, ScreenEventType};
use crate::services::metrics::VALIDATION_FAILURES_TOTAL;
use crate::services::participants::{current_screen, resolve_participant};
use crate::study::QuestionKind;
use crate::AppState;

#[derive(Template)]
#[template(path = "flow/start.html")]
pub struct StartTemplate {
    pub study_slug: String,
    pub participant_id: String,
    pub screen: ScreenView,
}

#[derive(Template)]
#[template(path = "flow/_screen.html")]
pub struct ScreenTemplate {
    pub study_slug: String,
    pub screen: ScreenView,
}

#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub participant: Option<String>,
}

impl StartParams {
    /// `?participant=new` starts over as a fresh participant.
    fn force_new(&self) -> bool {
        self.participant.as_deref() == Some("new")
    }
}

/// Study slugs follow the usual slug shape; the slug selects nothing yet.
fn check_study_slug(slug: &str) -> Result<(), AppError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Unknown study '{}'", slug)))
    }
}

fn invalid_screen_key() -> AppError {
    AppError::BadRequest("Invalid screen key".to_string())
}

/// `/{slug}` without the trailing slash.
pub async fn append_slash(Path(study_slug): Path<String>) -> Result<Redirect, AppError> {
    check_study_slug(&study_slug)?;
    Ok(Redirect::permanent(&format!("/{}/", study_slug)))
}

/// Full page on the participant's current screen; resumes where they left off.
#[instrument(skip(state, session, client, params))]
pub async fn start_study(
    State(state): State<AppState>,
    Path(study_slug): Path<String>,
    Query(params): Query<StartParams>,
    session: Session,
    client: ClientInfo,
) -> Result<StartTemplate, AppError> {
    check_study_slug(&study_slug)?;

    let participant =
        resolve_participant(&state.db, &session, &client, params.force_new()).await?;
    let (progress, screen) = current_screen(&state.db, state.study, &participant).await?;

    state
        .db
        .record_event(
            participant.participant_id,
            screen.key,
            ScreenEventType::Render,
        )
        .await?;

    info!(
        participant_id = %participant.participant_id,
        screen_key = %progress.current_screen_key,
        "Study page rendered"
    );

    Ok(StartTemplate {
        study_slug,
        participant_id: participant.participant_id.to_string(),
        screen: ScreenView::new(state.study, screen),
    })
}

/// Fragment for one screen. Loading a screen moves the participant there.
#[instrument(skip(state, session, client))]
pub async fn get_screen_fragment(
    State(state): State<AppState>,
    Path((study_slug, screen_key)): Path<(String, String)>,
    session: Session,
    client: ClientInfo,
) -> Result<ScreenTemplate, AppError> {
    check_study_slug(&study_slug)?;

    let participant = resolve_participant(&state.db, &session, &client, false).await?;
    let screen = state.study.screen(&screen_key).ok_or_else(invalid_screen_key)?;

    state
        .db
        .set_current_screen(participant.participant_id, screen.key)
        .await?;
    state
        .db
        .record_event(
            participant.participant_id,
            screen.key,
            ScreenEventType::Render,
        )
        .await?;

    Ok(ScreenTemplate {
        study_slug,
        screen: ScreenView::new(state.study, screen),
    })
}

/// Validate and store the answers for one screen, then render the next one.
/// Rejected submissions re-render the same screen with messages and leave
/// progress untouched.
#[instrument(skip(state, session, client, form))]
pub async fn submit_answer(
    State(state): State<AppState>,
    Path((study_slug, screen_key)): Path<(String, String)>,
    session: Session,
    client: ClientInfo,
    Form(form): Form<HashMap<String, String>>,
) -> Result<ScreenTemplate, AppError> {
    check_study_slug(&study_slug)?;

    let participant = resolve_participant(&state.db, &session, &client, false).await?;
    let screen = state.study.screen(&screen_key).ok_or_else(invalid_screen_key)?;

    let answers = match validate_answers(screen, &form) {
        Ok(answers) => answers,
        Err(failure) => {
            VALIDATION_FAILURES_TOTAL
                .with_label_values(&[screen.key])
                .inc();
            info!(
                participant_id = %participant.participant_id,
                screen_key = %screen.key,
                error_count = failure.errors.len(),
                "Submission rejected"
            );
            return Ok(ScreenTemplate {
                study_slug,
                screen: ScreenView::with_failure(state.study, screen, &failure),
            });
        }
    };

    let next_screen = screen.next_key.and_then(|key| state.study.screen(key));

    state
        .db
        .record_submission(
            participant.participant_id,
            screen.key,
            &answers,
            next_screen.map(|s| s.key),
        )
        .await?;

    // The terminal screen re-renders itself.
    let shown = next_screen.unwrap_or(screen);
    Ok(ScreenTemplate {
        study_slug,
        screen: ScreenView::new(state.study, shown),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_shape_is_enforced() {
        assert!(check_study_slug("demo").is_ok());
        assert!(check_study_slug("pilot_2-b").is_ok());
        assert!(check_study_slug("").is_err());
        assert!(check_study_slug("bad slug").is_err());
        assert!(check_study_slug("über").is_err());
    }

    #[test]
    fn only_literal_new_forces_a_fresh_participant() {
        let new = StartParams {
            participant: Some("new".to_string()),
        };
        let other = StartParams {
            participant: Some("old".to_string()),
        };
        let none = StartParams { participant: None };
        assert!(new.force_new());
        assert!(!other.force_new());
        assert!(!none.force_new());
    }
}
