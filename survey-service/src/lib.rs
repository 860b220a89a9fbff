//! Survey Service - server-rendered study flow for anonymous participants.

pub mod config;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod study;

use services::Database;
use std::sync::Arc;
use study::StudyGraph;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub study: &'static StudyGraph,
    pub default_study_slug: Arc<str>,
}

impl AppState {
    pub fn new(db: Database, study: &'static StudyGraph, default_study_slug: &str) -> Self {
        Self {
            db,
            study,
            default_study_slug: Arc::from(default_study_slug),
        }
    }
}
