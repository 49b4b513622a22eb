//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/google` - Google sign-in via ID token
/// - `GET /api/me` - Get current user information
/// - `GET /auth/google` - Start account-linking OAuth flow
/// - `GET /auth/google/callback` - OAuth callback (code exchange + link upsert)
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/google", post(handlers::google_auth))
        .route("/api/me", get(handlers::me_handler))
        .route("/auth/google", get(handlers::google_oauth_start))
        .route("/auth/google/callback", get(handlers::google_oauth_callback))
}
