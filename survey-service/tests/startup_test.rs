mod common;

use service_core::config::TelemetryConfig;
use service_core::error::AppError;
use survey_service::config::{DatabaseSettings, ServerSettings, SessionSettings, Settings};
use survey_service::startup::Application;
use survey_service::study::{Screen, ScreenKind, StudyGraph};

fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: "static".to_string(),
            default_study_slug: "demo".to_string(),
        },
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        session: SessionSettings::default(),
        telemetry: TelemetryConfig::default(),
    }
}

static DANGLING: [Screen; 1] = [Screen {
    key: "only",
    kind: ScreenKind::Content,
    text_html: "",
    image_url: None,
    questions: &[],
    next_key: Some("gone"),
}];
static DANGLING_STUDY: StudyGraph = StudyGraph::new("only", &DANGLING);

static LOOP: [Screen; 2] = [
    Screen {
        key: "a",
        kind: ScreenKind::Content,
        text_html: "",
        image_url: None,
        questions: &[],
        next_key: Some("b"),
    },
    Screen {
        key: "b",
        kind: ScreenKind::Interstitial,
        text_html: "",
        image_url: None,
        questions: &[],
        next_key: Some("a"),
    },
];
static LOOP_STUDY: StudyGraph = StudyGraph::new("a", &LOOP);

#[tokio::test]
async fn application_binds_and_migrates() {
    common::init_tracing();

    let app = Application::build(test_settings())
        .await
        .expect("Failed to build application");

    assert_ne!(app.port(), 0);
    assert_eq!(app.db().count_participants().await.unwrap(), 0);
    app.db().health_check().await.unwrap();
}

#[tokio::test]
async fn invalid_study_graph_fails_startup() {
    common::init_tracing();

    for study in [&DANGLING_STUDY, &LOOP_STUDY] {
        let result = Application::build_with_study(test_settings(), study).await;
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
