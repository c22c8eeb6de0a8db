// SPDX-License-Identifier: MIT

//! Session-cookie authentication middleware.
//!
//! Sessions are HS256 JWTs bound to the user's OIDC subject id and carried
//! in an HttpOnly cookie. Protected routes resolve the subject id to a
//! full user record on every request; anything that fails resolution
//! redirects back to the login-prompt page rather than returning 401,
//! since these are browser-facing routes.

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "badge_session";

const SESSION_LIFETIME_SECS: usize = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (OIDC subject id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user resolved from the session, threaded to handlers
/// as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires an established session.
///
/// Missing or invalid sessions redirect to `/` (never 200).
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Redirect::to("/").into_response();
    };

    match resolve_session(&state, cookie.value()).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Session resolution failed, redirecting to login prompt");
            Redirect::to("/").into_response()
        }
    }
}

/// Resolve a session token to the full user record.
pub async fn resolve_session(state: &AppState, token: &str) -> Result<User, AppError> {
    let subject_id = decode_session_token(token, &state.config.session_signing_key)?;

    state
        .db
        .get_user(&subject_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Validate a session JWT and return the bound subject id.
pub fn decode_session_token(token: &str, signing_key: &[u8]) -> Result<String, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims.sub)
}

/// Create a session JWT for a freshly authenticated user.
pub fn create_session_token(subject_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: subject_id.to_string(),
        iat: now,
        exp: now + SESSION_LIFETIME_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_session_key_32_bytes_min!!";

    #[test]
    fn session_token_round_trip() {
        let token = create_session_token("google-oauth2|12345", KEY).unwrap();
        let sub = decode_session_token(&token, KEY).unwrap();
        assert_eq!(sub, "google-oauth2|12345");
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = create_session_token("sub-1", KEY).unwrap();
        let result = decode_session_token(&token, b"completely_different_key_here!!");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let result = decode_session_token("not.a.jwt", KEY);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = Claims {
            sub: "sub-1".to_string(),
            iat: 1_000_000,
            exp: 1_000_060, // long past
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();

        let result = decode_session_token(&token, KEY);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
