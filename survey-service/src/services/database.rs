//! Database service for survey-service.

use crate::config::DatabaseSettings;
use crate::flow::Answer;
use crate::models::{Participant, Progress, ScreenEvent, ScreenEventType, SurveyResponse};
use crate::services::metrics::{DB_QUERY_DURATION, PARTICIPANTS_CREATED_TOTAL, SCREEN_EVENTS_TOTAL};
use chrono::Utc;
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{Sqlite, SqliteConnection, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool. Foreign keys are enforced on every connection so that
    /// deleting a participant cascades.
    #[instrument(skip(settings), fields(service = "survey-service"))]
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "Connecting to SQLite"
        );

        let options = SqliteConnectOptions::from_str(&settings.url)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid database url: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Participant Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, user_agent, ip_address))]
    pub async fn create_participant(
        &self,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<Participant, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_participant"])
            .start_timer();

        let now = Utc::now();
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (participant_id, user_agent, ip_address, created_utc, modified_utc)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING participant_id, user_agent, ip_address, created_utc, modified_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_agent)
        .bind(ip_address)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create participant: {}", e)))?;

        timer.observe_duration();
        PARTICIPANTS_CREATED_TOTAL.inc();

        info!(participant_id = %participant.participant_id, "Participant created");

        Ok(participant)
    }

    #[instrument(skip(self), fields(participant_id = %participant_id))]
    pub async fn get_participant(&self, participant_id: Uuid) -> Result<Option<Participant>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_participant"])
            .start_timer();

        let participant = sqlx::query_as::<_, Participant>(
            r#"
            SELECT participant_id, user_agent, ip_address, created_utc, modified_utc
            FROM participants
            WHERE participant_id = ?1
            "#,
        )
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get participant: {}", e)))?;

        timer.observe_duration();

        Ok(participant)
    }

    pub async fn count_participants(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Progress Operations
    // -------------------------------------------------------------------------

    /// Fetch the participant's progress, creating it on `initial_key` the first
    /// time. The primary key on `participant_id` keeps it one-to-one.
    #[instrument(skip(self), fields(participant_id = %participant_id))]
    pub async fn get_or_create_progress(
        &self,
        participant_id: Uuid,
        initial_key: &str,
    ) -> Result<Progress, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_or_create_progress"])
            .start_timer();

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO progress (participant_id, current_screen_key, created_utc, modified_utc)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (participant_id) DO NOTHING
            "#,
        )
        .bind(participant_id)
        .bind(initial_key)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create progress: {}", e)))?;

        let progress = sqlx::query_as::<_, Progress>(
            r#"
            SELECT participant_id, current_screen_key, created_utc, modified_utc
            FROM progress
            WHERE participant_id = ?1
            "#,
        )
        .bind(participant_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load progress: {}", e)))?;

        tx.commit().await?;
        timer.observe_duration();

        Ok(progress)
    }

    /// Move the participant's pointer. Callers pass keys already resolved
    /// against the study graph.
    #[instrument(skip(self), fields(participant_id = %participant_id))]
    pub async fn set_current_screen(&self, participant_id: Uuid, screen_key: &str) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["set_current_screen"])
            .start_timer();

        let mut conn = self.pool.acquire().await?;
        upsert_progress(&mut conn, participant_id, screen_key).await?;

        timer.observe_duration();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Response & Event Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, value), fields(participant_id = %participant_id))]
    pub async fn upsert_response(
        &self,
        participant_id: Uuid,
        screen_key: &str,
        question_id: &str,
        value: &serde_json::Value,
    ) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        upsert_response(&mut conn, participant_id, screen_key, question_id, value).await
    }

    #[instrument(skip(self), fields(participant_id = %participant_id))]
    pub async fn record_event(
        &self,
        participant_id: Uuid,
        screen_key: &str,
        event_type: ScreenEventType,
    ) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        insert_event(&mut conn, participant_id, screen_key, event_type).await
    }

    /// Persist an accepted submission atomically: every answer, the `submit`
    /// event and, when the screen has a successor, the progress move plus an
    /// `advance` event for the successor.
    #[instrument(skip(self, answers), fields(participant_id = %participant_id, answer_count = answers.len()))]
    pub async fn record_submission(
        &self,
        participant_id: Uuid,
        screen_key: &str,
        answers: &[Answer],
        next_key: Option<&str>,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_submission"])
            .start_timer();

        let mut tx: Transaction<'_, Sqlite> = self.pool.begin().await?;

        for answer in answers {
            upsert_response(&mut tx, participant_id, screen_key, answer.question_id, &answer.value).await?;
        }

        insert_event(&mut tx, participant_id, screen_key, ScreenEventType::Submit).await?;

        if let Some(next_key) = next_key {
            upsert_progress(&mut tx, participant_id, next_key).await?;
            insert_event(&mut tx, participant_id, next_key, ScreenEventType::Advance).await?;
        }

        tx.commit().await?;
        timer.observe_duration();

        info!(
            screen_key = %screen_key,
            next_key = next_key.unwrap_or("-"),
            "Submission recorded"
        );

        Ok(())
    }

    pub async fn list_responses(&self, participant_id: Uuid) -> Result<Vec<SurveyResponse>, AppError> {
        let responses = sqlx::query_as::<_, SurveyResponse>(
            r#"
            SELECT participant_id, screen_key, question_id, value, created_utc, modified_utc
            FROM responses
            WHERE participant_id = ?1
            ORDER BY response_id
            "#,
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(responses)
    }

    pub async fn list_events(&self, participant_id: Uuid) -> Result<Vec<ScreenEvent>, AppError> {
        let events = sqlx::query_as::<_, ScreenEvent>(
            r#"
            SELECT event_id, participant_id, screen_key, event_type, timestamp_utc
            FROM screen_events
            WHERE participant_id = ?1
            ORDER BY event_id
            "#,
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}

async fn upsert_progress(
    conn: &mut SqliteConnection,
    participant_id: Uuid,
    screen_key: &str,
) -> Result<(), AppError> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO progress (participant_id, current_screen_key, created_utc, modified_utc)
        VALUES (?1, ?2, ?3, ?3)
        ON CONFLICT (participant_id)
        DO UPDATE SET current_screen_key = excluded.current_screen_key,
                      modified_utc = excluded.modified_utc
        "#,
    )
    .bind(participant_id)
    .bind(screen_key)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update progress: {}", e)))?;
    Ok(())
}

async fn upsert_response(
    conn: &mut SqliteConnection,
    participant_id: Uuid,
    screen_key: &str,
    question_id: &str,
    value: &serde_json::Value,
) -> Result<(), AppError> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO responses (participant_id, screen_key, question_id, value, created_utc, modified_utc)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT (participant_id, screen_key, question_id)
        DO UPDATE SET value = excluded.value,
                      modified_utc = excluded.modified_utc
        "#,
    )
    .bind(participant_id)
    .bind(screen_key)
    .bind(question_id)
    .bind(Json(value))
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to save response: {}", e)))?;
    Ok(())
}

async fn insert_event(
    conn: &mut SqliteConnection,
    participant_id: Uuid,
    screen_key: &str,
    event_type: ScreenEventType,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO screen_events (participant_id, screen_key, event_type, timestamp_utc)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(participant_id)
    .bind(screen_key)
    .bind(event_type.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to log screen event: {}", e)))?;

    SCREEN_EVENTS_TOTAL
        .with_label_values(&[event_type.as_str(), screen_key])
        .inc();

    Ok(())
}
