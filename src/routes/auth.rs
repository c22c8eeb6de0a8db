// SPDX-License-Identifier: MIT

//! Google OAuth login/callback/logout routes.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_token, SESSION_COOKIE};
use crate::models::User;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/logout", get(logout))
}

/// Build the callback URL from the request's Host header.
///
/// Both /login and /callback derive the redirect URI through this one
/// helper so the scheme always matches between the authorization request
/// and the token exchange; Google rejects the exchange otherwise.
fn external_callback_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/callback", scheme, host)
}

/// Start the login flow - redirect to Google's authorization endpoint.
async fn login(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Redirect> {
    let callback_url = external_callback_url(&headers);
    let oauth_state = create_signed_state(&state.config.session_signing_key)?;

    let auth_url = state
        .oauth
        .authorization_url(&callback_url, &oauth_state)
        .await?;

    tracing::info!(callback_url = %callback_url, "Starting OAuth flow, redirecting to Google");

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code, upsert the user, establish a session.
async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    // Provider-reported errors (user denied consent, etc.) end the flow
    // without a session; the user must restart from /login.
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return Ok((jar, Redirect::to("/")));
    }

    let verified_state = params
        .state
        .as_deref()
        .is_some_and(|s| verify_signed_state(s, &state.config.session_signing_key));
    if !verified_state {
        tracing::warn!("Invalid or tampered OAuth state parameter");
        return Ok((jar, Redirect::to("/")));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("missing authorization code".to_string()))?;

    let callback_url = external_callback_url(&headers);

    tracing::info!("Exchanging authorization code for tokens");

    let profile = state.oauth.complete_login(&code, &callback_url).await?;

    let now = chrono::Utc::now().to_rfc3339();

    // Create only on first login so a stored profile_url is never clobbered.
    match state.db.get_user(&profile.sub).await? {
        Some(_) => {
            state.db.touch_last_login(&profile.sub, &now).await?;
            tracing::info!(subject_id = %profile.sub, "Returning user logged in");
        }
        None => {
            state
                .db
                .create_user(&User::from_oidc_profile(&profile, &now))
                .await?;
            tracing::info!(subject_id = %profile.sub, "New user created");
        }
    }

    let token = create_session_token(&profile.sub, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to("/")))
}

/// Logout - clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(cookie), Redirect::to("/"))
}

/// Create an HMAC-signed state parameter: "timestamp_hex|signature_hex",
/// base64url encoded.
fn create_signed_state(secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{:x}", timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature on an OAuth state parameter.
fn verify_signed_state(state: &str, secret: &[u8]) -> bool {
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(state) else {
        return false;
    };
    let Ok(state_str) = String::from_utf8(bytes) else {
        return false;
    };

    let parts: Vec<&str> = state_str.splitn(2, '|').collect();
    if parts.len() != 2 {
        return false;
    }

    let payload = parts[0];
    let signature_hex = parts[1];

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());

    let expected = hex::encode(mac.finalize().into_bytes());
    if signature_hex != expected {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    true
}
