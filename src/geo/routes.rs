//! Geocoding routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the geocoding router
///
/// # Routes
/// - `GET /api/geocode` - Forward-geocode a free-text place description
pub fn geo_routes() -> Router {
    Router::new().route("/api/geocode", get(handlers::geocode))
}
