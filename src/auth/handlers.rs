//! Authentication handlers

use axum::extract::{Extension, Json, Query};
use axum::response::Redirect;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::AuthedUser;
use super::models::{Claims, GoogleIdTokenPayload, User};
use crate::common::helpers::safe_token_log;
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState};

/// POST /api/auth/google
/// Authenticates a user via Google OAuth ID token
///
/// # Request Body
/// ```json
/// {
///   "id_token": "<google id token>"
/// }
/// ```
///
/// # Response
/// ```json
/// {
///   "token": "<jwt token>",
///   "user": { ... }
/// }
/// ```
pub async fn google_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Received Google auth request");
    let state = state_lock.read().await.clone();

    // Verify token with Google's tokeninfo endpoint
    // Docs: https://developers.google.com/identity/sign-in/web/backend-auth
    let tokeninfo_url = format!(
        "https://oauth2.googleapis.com/tokeninfo?id_token={}",
        payload.id_token
    );

    debug!("Initiating Google token validation with tokeninfo endpoint");

    let resp = state.http.get(&tokeninfo_url).send().await;
    let body = match resp {
        Ok(r) => {
            let status = r.status();
            debug!(http_status = %status, "Received response from Google tokeninfo endpoint");

            if status.is_success() {
                match r.json::<serde_json::Value>().await {
                    Ok(j) => j,
                    Err(e) => {
                        error!(error = %e, "Failed to parse Google tokeninfo JSON response");
                        return Err(ApiError::BadRequest("malformed id_token".to_string()));
                    }
                }
            } else {
                match status.as_u16() {
                    400 => {
                        warn!(http_status = %status, "Google tokeninfo rejected token as malformed");
                        return Err(ApiError::BadRequest(
                            "invalid or malformed id_token".to_string(),
                        ));
                    }
                    401 => {
                        warn!(http_status = %status, "Google tokeninfo rejected token as expired");
                        return Err(ApiError::Unauthorized(
                            "expired or invalid id_token".to_string(),
                        ));
                    }
                    _ => {
                        warn!(http_status = %status, "Google tokeninfo returned error status");
                        return Err(ApiError::BadRequest(
                            "id_token validation failed".to_string(),
                        ));
                    }
                }
            }
        }
        Err(e) => {
            error!(
                error = %e,
                endpoint = "https://oauth2.googleapis.com/tokeninfo",
                "HTTP error contacting Google tokeninfo endpoint"
            );
            return Err(ApiError::InternalServer(
                "google token validation service unavailable".to_string(),
            ));
        }
    };

    // Extract required fields: email, sub
    let email = body
        .get("email")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let sub = body.get("sub").and_then(|v| v.as_str()).map(str::to_string);
    let name = body
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    if email.is_none() || sub.is_none() {
        warn!(
            has_email = email.is_some(),
            has_sub = sub.is_some(),
            "Google token missing required fields (email/sub)"
        );
        return Err(ApiError::BadRequest(
            "token missing required fields".to_string(),
        ));
    }

    // Check token expiration
    if let Some(exp) = body.get("exp").and_then(|v| v.as_i64()) {
        if exp < Utc::now().timestamp() {
            warn!(token_exp = exp, "Google token has expired");
            return Err(ApiError::Unauthorized("token has expired".to_string()));
        }
    }

    // Validate audience against the configured client id
    let client_id = &state.config.google.client_id;
    match body.get("aud").and_then(|v| v.as_str()) {
        Some(aud_val) if aud_val == client_id.as_str() => {
            debug!("Google token audience validation successful");
        }
        Some(aud_val) => {
            warn!(
                token_audience = %aud_val,
                "Google token audience validation failed - rejecting token"
            );
            return Err(ApiError::Unauthorized("token audience mismatch".to_string()));
        }
        None => {
            warn!("Google token missing audience field - rejecting token");
            return Err(ApiError::Unauthorized("token missing audience".to_string()));
        }
    }

    let email = email.unwrap();
    let sub = sub.unwrap();

    debug!(
        email = %safe_email_log(&email),
        provider = "google",
        "Google token validation successful, proceeding with user lookup"
    );

    let user = find_or_create_user(&state.db, &email, &sub, name.as_deref()).await?;

    // create JWT
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.clone(),
        exp,
    };
    let token = match encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "JWT encoding error during authentication");
            return Err(ApiError::InternalServer("jwt error".to_string()));
        }
    };

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    let resp = serde_json::json!({
        "token": token,
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
        },
    });

    Ok(Json(resp))
}

/// GET /api/me
/// Returns the current authenticated user's information
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(serde_json::json!({ "user": user })))
}

// ---- Account linking (OAuth code flow) ----

/// GET /auth/google - Start the Google account-linking flow
/// Redirects the user to Google's authorization page
pub async fn google_oauth_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Redirect {
    let state = state_lock.read().await;

    let auth_url = state.google_service.authorization_url();
    info!("Redirecting to Google OAuth consent page");
    Redirect::to(&auth_url)
}

/// GET /auth/google/callback - Handle OAuth callback from Google
///
/// Exchanges the authorization code, resolves the account email, and
/// upserts the stored refresh token. The end user only ever sees a
/// redirect back to the app with a success or generic failure flag;
/// provider error detail stays in the server log.
pub async fn google_oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    let frontend = &state.config.frontend_url;

    // Provider-reported error (user denied consent, etc.)
    if let Some(provider_error) = params.get("error") {
        error!(oauth_error = %provider_error, "Google OAuth returned error");
        return Ok(failure_redirect(frontend));
    }

    // Missing code is a caller mistake, not a provider failure: 400.
    let code = params.get("code").ok_or_else(|| {
        warn!("OAuth callback missing authorization code");
        ApiError::BadRequest("No authorization code provided".to_string())
    })?;

    info!("Received OAuth callback with authorization code");

    // Exchange code for tokens
    let token_response = match state.google_service.exchange_code(code).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to exchange authorization code for tokens");
            return Ok(failure_redirect(frontend));
        }
    };

    // Without a refresh token there is nothing durable to store.
    let refresh_token = match token_response.refresh_token {
        Some(t) => t,
        None => {
            error!("Token exchange succeeded but returned no refresh token");
            return Ok(failure_redirect(frontend));
        }
    };

    // Resolve the authenticated identity's email
    let email = match state
        .google_service
        .fetch_user_email(&token_response.access_token)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            error!(error = %e, "Failed to resolve account email from access token");
            return Ok(failure_redirect(frontend));
        }
    };

    // Persist the link; last write wins for the same (email, provider)
    if let Err(e) = upsert_account_link(&state.db, &email, "google", &refresh_token).await {
        error!(
            error = %e,
            email = %safe_email_log(&email),
            "Database error storing account link"
        );
        return Ok(failure_redirect(frontend));
    }

    info!(
        email = %safe_email_log(&email),
        refresh_token = %safe_token_log(&refresh_token),
        provider = "google",
        "Account link stored"
    );

    Ok(Redirect::to(&format!("{}/?success=true", frontend)))
}

fn failure_redirect(frontend_url: &str) -> Redirect {
    Redirect::to(&format!("{}/?error=auth_failed", frontend_url))
}

// ---- Helper Functions ----

/// Insert-or-update the stored refresh token for (email, provider)
pub async fn upsert_account_link(
    pool: &SqlitePool,
    email: &str,
    provider: &str,
    refresh_token: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO account_links (user_email, provider, refresh_token, updated_at)
        VALUES (?, ?, ?, datetime('now'))
        ON CONFLICT(user_email, provider) DO UPDATE SET
            refresh_token = excluded.refresh_token,
            updated_at = datetime('now')
        "#,
    )
    .bind(email)
    .bind(provider)
    .bind(refresh_token)
    .execute(pool)
    .await?;

    Ok(())
}

/// Find a user by (provider, provider_id), creating one on first sign-in
async fn find_or_create_user(
    pool: &SqlitePool,
    email: &str,
    provider_id: &str,
    name: Option<&str>,
) -> Result<User, ApiError> {
    let existing: Option<User> =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE provider = ? AND provider_id = ?")
            .bind("google")
            .bind(provider_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error checking existing user during OAuth flow");
                ApiError::DatabaseError(e)
            })?;

    if let Some(u) = existing {
        return Ok(u);
    }

    let id = generate_user_id();
    info!(
        user_id = %id,
        email = %safe_email_log(email),
        provider = "google",
        "Creating new user account via Google OAuth"
    );

    sqlx::query(
        "INSERT OR IGNORE INTO users (id, email, name, provider, provider_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(name)
    .bind("google")
    .bind(provider_id)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %id,
            email = %safe_email_log(email),
            "Database error inserting new user during OAuth flow"
        );
        ApiError::DatabaseError(e)
    })?;

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %id, "Database error fetching newly created user");
            ApiError::DatabaseError(e)
        })
}
