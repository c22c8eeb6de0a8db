//! Application configuration loaded from environment variables and Secret Manager.
//!
//! The OAuth client credential is fetched once at startup and cached in
//! memory; nothing re-reads Secret Manager per request.

use std::env;

use serde::Deserialize;

/// Default Secret Manager secret holding the OAuth client credential JSON.
pub const DEFAULT_OAUTH_SECRET_NAME: &str = "badgetracker-oauth-client-secret";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// GCP project ID (Firestore + Secret Manager)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Secret Manager secret name for the OAuth client credential
    pub oauth_secret_name: String,

    // --- Secrets ---
    /// Google OAuth client ID
    pub oauth_client_id: String,
    /// Google OAuth client secret
    pub oauth_client_secret: String,
    /// Session-token signing key (raw bytes); random per process if unset
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development the OAuth client id/secret can be set via
    /// `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET`. In production, use
    /// `load_with_secrets()` to fetch them from Secret Manager.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            oauth_secret_name: env::var("OAUTH_SECRET_NAME")
                .unwrap_or_else(|_| DEFAULT_OAUTH_SECRET_NAME.to_string()),
            oauth_client_id: env::var("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            oauth_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            session_signing_key: session_signing_key_from_env()?,
        })
    }

    /// Load configuration with the OAuth client credential from Secret Manager.
    ///
    /// This is the recommended method for production deployments. The secret
    /// payload is JSON in the Google client-secret download format:
    /// `{"web": {"client_id": ..., "client_secret": ...}}`.
    pub async fn load_with_secrets(
        secrets: &crate::services::SecretProvider,
    ) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let gcp_project_id =
            env::var("GCP_PROJECT_ID").map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?;
        let oauth_secret_name = env::var("OAUTH_SECRET_NAME")
            .unwrap_or_else(|_| DEFAULT_OAUTH_SECRET_NAME.to_string());

        tracing::info!(
            project = %gcp_project_id,
            secret = %oauth_secret_name,
            "Fetching OAuth client credential from Secret Manager"
        );

        let payload = secrets
            .access(&oauth_secret_name, "latest")
            .await
            .map_err(|e| ConfigError::SecretManager(e.to_string()))?;

        let credential: OAuthClientCredential = serde_json::from_str(&payload)
            .map_err(|e| ConfigError::SecretManager(format!("invalid credential JSON: {e}")))?;

        tracing::info!("OAuth client credential loaded and cached");

        Ok(Self {
            gcp_project_id,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            oauth_secret_name,
            oauth_client_id: credential.web.client_id,
            oauth_client_secret: credential.web.client_secret,
            session_signing_key: session_signing_key_from_env()?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            oauth_secret_name: DEFAULT_OAUTH_SECRET_NAME.to_string(),
            oauth_client_id: "test_client_id".to_string(),
            oauth_client_secret: "test_client_secret".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!".to_vec(),
        }
    }
}

/// Read the session signing key from the environment, or generate a random
/// one. Random keys mean sessions do not survive a process restart.
fn session_signing_key_from_env() -> Result<Vec<u8>, ConfigError> {
    if let Ok(key) = env::var("SESSION_SIGNING_KEY") {
        return Ok(key.into_bytes());
    }

    use ring::rand::{SecureRandom, SystemRandom};

    tracing::warn!("SESSION_SIGNING_KEY not set; sessions will not survive restart");

    let mut key = vec![0u8; 32];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| ConfigError::SigningKey)?;
    Ok(key)
}

/// Google client-secret download format.
#[derive(Debug, Deserialize)]
struct OAuthClientCredential {
    web: WebCredential,
}

#[derive(Debug, Deserialize)]
struct WebCredential {
    client_id: String,
    client_secret: String,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Secret Manager error: {0}")]
    SecretManager(String),

    #[error("Failed to generate a session signing key")]
    SigningKey,
}
