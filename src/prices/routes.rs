//! Price point routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the price point router
///
/// # Routes
/// - `POST /api/price-points` - Derive price points from a saved transaction
pub fn price_routes() -> Router {
    Router::new().route("/api/price-points", post(handlers::create_price_points))
}
