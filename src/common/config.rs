// src/common/config.rs
//! Process configuration loaded once at startup
//!
//! All required keys are checked together so a misconfigured deployment
//! fails with a single error naming every missing variable, instead of
//! failing deep inside a handler on the first request that needs one.

use std::env;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Google OAuth client credentials
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Application configuration, read from the environment exactly once
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google: GoogleOAuthConfig,
    pub geocoding_token: String,
    pub jwt_secret: String,
    pub database_url: String,
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();

        let mut require = |key: &str| match env::var(key) {
            Ok(v) if !v.trim().is_empty() => Some(v),
            _ => {
                missing.push(key.to_string());
                None
            }
        };

        let client_id = require("GOOGLE_CLIENT_ID");
        let client_secret = require("GOOGLE_CLIENT_SECRET");
        let redirect_uri = require("GOOGLE_OAUTH_REDIRECT_URI");
        let geocoding_token = require("GEOCODING_API_TOKEN");
        let jwt_secret = require("JWT_SECRET");

        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://finmemory.db".to_string());
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| {
                "http://localhost:3000,http://localhost:5173".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let port_raw = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                value: port_raw,
            })?;

        info!(port, database_url = %database_url, "Configuration loaded");

        Ok(Self {
            google: GoogleOAuthConfig {
                client_id: client_id.unwrap(),
                client_secret: client_secret.unwrap(),
                redirect_uri: redirect_uri.unwrap(),
            },
            geocoding_token: geocoding_token.unwrap(),
            jwt_secret: jwt_secret.unwrap(),
            database_url,
            frontend_url,
            cors_origins,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const REQUIRED: [&str; 5] = [
        "GOOGLE_CLIENT_ID",
        "GOOGLE_CLIENT_SECRET",
        "GOOGLE_OAUTH_REDIRECT_URI",
        "GEOCODING_API_TOKEN",
        "JWT_SECRET",
    ];

    fn clear_env() {
        for key in REQUIRED {
            env::remove_var(key);
        }
        for key in ["DATABASE_URL", "FRONTEND_URL", "CORS_ORIGINS", "PORT"] {
            env::remove_var(key);
        }
    }

    fn set_all_required() {
        env::set_var("GOOGLE_CLIENT_ID", "client-id");
        env::set_var("GOOGLE_CLIENT_SECRET", "client-secret");
        env::set_var("GOOGLE_OAUTH_REDIRECT_URI", "http://localhost:8080/auth/google/callback");
        env::set_var("GEOCODING_API_TOKEN", "pk.test");
        env::set_var("JWT_SECRET", "secret");
    }

    #[test]
    fn test_missing_keys_are_all_reported() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("GOOGLE_CLIENT_ID", "client-id");

        let err = AppConfig::from_env().unwrap_err();
        match err {
            ConfigError::MissingKeys(keys) => {
                assert!(!keys.contains(&"GOOGLE_CLIENT_ID".to_string()));
                assert!(keys.contains(&"GOOGLE_CLIENT_SECRET".to_string()));
                assert!(keys.contains(&"GOOGLE_OAUTH_REDIRECT_URI".to_string()));
                assert!(keys.contains(&"GEOCODING_API_TOKEN".to_string()));
                assert!(keys.contains(&"JWT_SECRET".to_string()));
            }
            other => panic!("expected MissingKeys, got {other:?}"),
        }
        clear_env();
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        set_all_required();
        env::set_var("JWT_SECRET", "   ");

        let err = AppConfig::from_env().unwrap_err();
        match err {
            ConfigError::MissingKeys(keys) => {
                assert_eq!(keys, vec!["JWT_SECRET".to_string()]);
            }
            other => panic!("expected MissingKeys, got {other:?}"),
        }
        clear_env();
    }

    #[test]
    fn test_defaults_applied() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        set_all_required();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.database_url, "sqlite://finmemory.db");
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.port, 8080);
        assert!(!config.cors_origins.is_empty());
        clear_env();
    }

    #[test]
    fn test_invalid_port_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        set_all_required();
        env::set_var("PORT", "not-a-port");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        clear_env();
    }
}
