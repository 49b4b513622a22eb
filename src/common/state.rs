// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::services::{GeocoderService, GoogleService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub config: Arc<AppConfig>,
    pub google_service: Arc<GoogleService>,
    pub geocoder: Arc<GeocoderService>,
}
