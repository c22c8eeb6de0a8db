// SPDX-License-Identifier: MIT

//! Google OAuth2/OpenID Connect client.
//!
//! Drives the authorization-code flow: endpoint discovery via the
//! well-known configuration document (cached), authorization URL
//! construction, code-for-token exchange, and userinfo retrieval.

use crate::error::AppError;
use anyhow::Context;
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

const DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Scopes requested on every login.
pub const OAUTH_SCOPES: &str = "openid email profile";

/// OpenID Connect discovery document (the endpoints we use).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDocument {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

/// Normalized user profile from the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Stable subject id issued by Google
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
enum EndpointMode {
    /// Resolve endpoints from the well-known discovery document.
    WellKnown,
    /// Fixed endpoints, for deterministic local/integration tests.
    Static(DiscoveryDocument),
}

#[derive(Clone)]
struct DiscoveryCacheEntry {
    document: DiscoveryDocument,
    expires_at: Instant,
}

/// OAuth client for the Google identity provider.
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    mode: EndpointMode,
    discovery_cache: RwLock<Option<DiscoveryCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl GoogleOAuthClient {
    /// Create a production client that discovers and caches Google endpoints.
    pub fn new(client_id: String, client_secret: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building OAuth HTTP client")?;

        Ok(Self {
            http,
            client_id,
            client_secret,
            mode: EndpointMode::WellKnown,
            discovery_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Create a client with fixed endpoints (no discovery fetch).
    pub fn new_with_endpoints(
        client_id: String,
        client_secret: String,
        endpoints: DiscoveryDocument,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building OAuth HTTP client")?;

        Ok(Self {
            http,
            client_id,
            client_secret,
            mode: EndpointMode::Static(endpoints),
            discovery_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Build the authorization-request URL for a login redirect.
    ///
    /// The `redirect_uri` here must be byte-identical to the one later
    /// passed to `complete_login`, or Google rejects the exchange.
    pub async fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
    ) -> Result<String, AppError> {
        let endpoints = self.discover().await?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            endpoints.authorization_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        ))
    }

    /// Complete the login: exchange the authorization code, then fetch the
    /// normalized profile from the userinfo endpoint.
    ///
    /// An invalid or expired code surfaces as an authentication failure;
    /// there is no retry, the user must restart login.
    pub async fn complete_login(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<UserInfo, AppError> {
        let endpoints = self.discover().await?;
        let tokens = self.exchange_code(&endpoints, code, redirect_uri).await?;
        self.fetch_userinfo(&endpoints, &tokens.access_token).await
    }

    /// Exchange an authorization code for tokens at the token endpoint.
    async fn exchange_code(
        &self,
        endpoints: &DiscoveryDocument,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&endpoints.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OAuth(format!(
                "token exchange rejected (HTTP {}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("invalid token response: {}", e)))
    }

    /// Fetch the user profile from the userinfo endpoint.
    async fn fetch_userinfo(
        &self,
        endpoints: &DiscoveryDocument,
        access_token: &str,
    ) -> Result<UserInfo, AppError> {
        let response = self
            .http
            .get(&endpoints.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::OAuth(format!(
                "userinfo returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("invalid userinfo response: {}", e)))
    }

    /// Resolve the provider endpoints, refreshing the cache if stale.
    async fn discover(&self) -> Result<DiscoveryDocument, AppError> {
        if let EndpointMode::Static(endpoints) = &self.mode {
            return Ok(endpoints.clone());
        }

        if let Some(entry) = self.lookup_cached_discovery().await {
            return Ok(entry);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited for the lock.
        if let Some(entry) = self.lookup_cached_discovery().await {
            return Ok(entry);
        }

        let response = self
            .http
            .get(DISCOVERY_URL)
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("discovery request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::OAuth(format!(
                "discovery returned HTTP {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let document: DiscoveryDocument = response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("invalid discovery JSON: {}", e)))?;

        *self.discovery_cache.write().await = Some(DiscoveryCacheEntry {
            document: document.clone(),
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "OIDC discovery cache refreshed");

        Ok(document)
    }

    async fn lookup_cached_discovery(&self) -> Option<DiscoveryDocument> {
        let cache = self.discovery_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.document.clone())
    }
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    let Some(max_age) = headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
    else {
        return fallback;
    };

    Duration::from_secs(max_age)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    for directive in value.split(',') {
        let directive = directive.trim();

        if let Some(raw) = directive.strip_prefix("max-age=") {
            let raw = raw.trim_matches('"');
            if let Ok(seconds) = raw.parse::<u64>() {
                return Some(seconds);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_endpoints() -> DiscoveryDocument {
        DiscoveryDocument {
            authorization_endpoint: "https://accounts.example.com/o/oauth2/auth".to_string(),
            token_endpoint: "https://oauth2.example.com/token".to_string(),
            userinfo_endpoint: "https://openidconnect.example.com/v1/userinfo".to_string(),
        }
    }

    #[test]
    fn parse_cache_control_max_age_valid() {
        assert_eq!(
            parse_cache_control_max_age("public, max-age=3600"),
            Some(3600)
        );
        assert_eq!(parse_cache_control_max_age("max-age=60"), Some(60));
        assert_eq!(parse_cache_control_max_age("max-age=\"120\""), Some(120));
    }

    #[test]
    fn parse_cache_control_max_age_invalid() {
        assert_eq!(parse_cache_control_max_age("public, immutable"), None);
        assert_eq!(parse_cache_control_max_age("max-age=abc"), None);
        assert_eq!(parse_cache_control_max_age(""), None);
    }

    #[tokio::test]
    async fn authorization_url_contains_required_params() {
        let client = GoogleOAuthClient::new_with_endpoints(
            "client-123".to_string(),
            "shh".to_string(),
            test_endpoints(),
        )
        .unwrap();

        let url = client
            .authorization_url("https://badges.example.com/callback", "opaque-state")
            .await
            .unwrap();

        assert!(url.starts_with("https://accounts.example.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=opaque-state"));
        assert!(url.contains(&format!(
            "redirect_uri={}",
            urlencoding::encode("https://badges.example.com/callback")
        )));
    }

    #[test]
    fn userinfo_tolerates_missing_optional_fields() {
        let json = r#"{"sub": "1234567890"}"#;
        let info: UserInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.sub, "1234567890");
        assert!(info.name.is_none());
        assert!(info.email.is_none());
        assert!(info.picture.is_none());
    }
}
