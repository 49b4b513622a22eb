//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub created_at: Option<String>,
}

/// A stored third-party account link: one refresh token per
/// (email, provider) pair, overwritten on every successful callback
#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct AccountLink {
    pub user_email: String,
    pub provider: String,
    pub refresh_token: String,
    pub updated_at: Option<String>,
}

/// Google ID token payload for sign-in
#[derive(Deserialize)]
pub struct GoogleIdTokenPayload {
    pub id_token: String,
}
