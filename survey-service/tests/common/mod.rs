//! Common test utilities for survey-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use std::sync::Once;
use survey_service::config::{DatabaseSettings, SessionSettings};
use survey_service::services::Database;
use survey_service::startup::build_router;
use survey_service::study::STUDY;
use survey_service::AppState;
use tower::ServiceExt;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,survey_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Participant id embedded in the full study page.
    pub fn participant_id(&self) -> Uuid {
        let marker = "data-participant-id=\"";
        let start = self.body.find(marker).expect("page carries participant id") + marker.len();
        let end = start + self.body[start..].find('"').expect("closing quote");
        Uuid::parse_str(&self.body[start..end]).expect("participant id is a uuid")
    }

    pub fn shows_screen(&self, key: &str) -> bool {
        self.body.contains(&format!("data-screen-key=\"{}\"", key))
    }
}

/// In-process app on a private in-memory database, behaving like one browser:
/// the session cookie is replayed on every request.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    cookie: Option<String>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        init_tracing();

        // One connection: every connection to `sqlite::memory:` is its own database.
        let db = Database::connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        })
        .await
        .expect("Failed to open in-memory database");
        db.run_migrations().await.expect("Failed to run migrations");

        let state = AppState::new(db.clone(), &STUDY, "demo");
        let router = build_router(state, &SessionSettings::default(), "static");

        Self {
            router,
            db,
            cookie: None,
        }
    }

    /// Drop the session cookie, as a fresh browser would.
    pub fn clear_cookie(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().method("GET").uri(uri);
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(form.to_string())).await
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }
        request = request.header(header::USER_AGENT, "survey-tests/1.0");

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            self.cookie = Some(pair);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }

    pub async fn current_screen_key(&self, participant_id: Uuid) -> String {
        sqlx::query_scalar("SELECT current_screen_key FROM progress WHERE participant_id = ?1")
            .bind(participant_id)
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }

    pub async fn event_types(&self, participant_id: Uuid) -> Vec<(String, String)> {
        self.db
            .list_events(participant_id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| {
                let ty = e.parsed_type().expect("known event type");
                (ty.to_string(), e.screen_key)
            })
            .collect()
    }
}
