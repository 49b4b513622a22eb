// src/services/google.rs
//! Google OAuth2 integration: consent URL, code exchange, identity lookup

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::common::config::GoogleOAuthConfig;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    config: GoogleOAuthConfig,
    client: Client,
}

impl GoogleService {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Build the authorization URL for the OAuth consent flow
    ///
    /// `access_type=offline` and `prompt=consent` make Google return a
    /// refresh token on every exchange, not only the first one.
    pub fn authorization_url(&self) -> String {
        let scopes = ["openid", "email", "profile"];
        let scope_param = scopes.join(" ");

        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scope_param)
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, GoogleError> {
        let params = [
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(GoogleError::OAuthFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

        info!(
            has_refresh_token = token_response.refresh_token.is_some(),
            "Exchanged authorization code for tokens"
        );
        Ok(token_response)
    }

    /// Resolve the authenticated identity's email from an access token
    pub async fn fetch_user_email(&self, access_token: &str) -> Result<String, GoogleError> {
        let response = self
            .client
            .get("https://www.googleapis.com/oauth2/v2/userinfo")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleError::RequestFailed(
                "Failed to get user info".to_string(),
            ));
        }

        #[derive(Deserialize)]
        struct UserInfo {
            email: String,
        }

        let user_info = response
            .json::<UserInfo>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

        Ok(user_info.email)
    }
}
