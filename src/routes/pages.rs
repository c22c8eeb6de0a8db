// SPDX-License-Identifier: MIT

//! Server-rendered pages: index, badge classification, profile URL update.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{resolve_session, CurrentUser, SESSION_COOKIE};
use crate::models::User;
use crate::services::CurriculumProgress;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/badges", get(badges))
        .route("/update", get(update))
}

/// Index - logged-out prompt or logged-in summary.
///
/// Public route: session resolution is attempted but never required.
async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => resolve_session(&state, cookie.value()).await.ok(),
        None => None,
    };

    match user {
        Some(user) => Html(render_summary(&user)),
        None => Html(render_login_prompt()),
    }
}

/// Badge classification page.
///
/// Redirects to `/` when no profile URL is stored. A scrape failure
/// renders the page with an explicit "unavailable" notice instead of
/// pretending the user completed zero badges.
async fn badges(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response> {
    let Some(profile_url) = user.profile_url.as_deref() else {
        return Ok(Redirect::to("/").into_response());
    };

    let (completed, fetch_failed) = match state.badges.fetch_completed_badges(profile_url).await {
        Ok(badges) => (badges, false),
        Err(e) => {
            tracing::warn!(error = %e, profile_url = %profile_url, "Badge page fetch failed");
            (Vec::new(), true)
        }
    };

    tracing::info!(
        subject_id = %user.subject_id,
        badge_count = completed.len(),
        "Classifying completed badges"
    );

    let progress = state.curricula.classify(&completed);

    Ok(Html(render_badges(&user, &progress, fetch_failed)).into_response())
}

#[derive(Deserialize)]
pub struct UpdateParams {
    profile_url: String,
}

/// Persist the user's Skills Boost profile URL, then redirect to `/`.
async fn update(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<UpdateParams>,
) -> Result<Redirect> {
    let profile_url = params.profile_url.trim();

    let parsed = reqwest::Url::parse(profile_url)
        .map_err(|_| AppError::BadRequest("profile_url is not a valid URL".to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AppError::BadRequest(
            "profile_url must be an http(s) URL".to_string(),
        ));
    }

    state
        .db
        .update_profile_url(&user.subject_id, profile_url)
        .await?;

    tracing::info!(subject_id = %user.subject_id, "Profile URL updated");

    Ok(Redirect::to("/"))
}

// ─── Rendering ───────────────────────────────────────────────

fn render_login_prompt() -> String {
    page(
        "Badge Tracker",
        "<p>Track your Google Cloud Skills Boost badges.</p>\
         <p><a href=\"/login\">Sign in with Google</a></p>"
            .to_string(),
    )
}

fn render_summary(user: &User) -> String {
    let mut body = String::new();

    if let Some(picture) = &user.picture {
        let _ = write!(
            body,
            "<img src=\"{}\" alt=\"profile picture\" width=\"64\">",
            escape_html(picture)
        );
    }

    let _ = write!(body, "<h2>Welcome, {}</h2>", escape_html(&user.name));
    if let Some(email) = &user.email {
        let _ = write!(body, "<p>{}</p>", escape_html(email));
    }

    match &user.profile_url {
        Some(url) => {
            let _ = write!(
                body,
                "<p>Badge profile: {}</p><p><a href=\"/badges\">View badge progress</a></p>",
                escape_html(url)
            );
        }
        None => {
            body.push_str("<p>No badge profile URL set yet.</p>");
        }
    }

    body.push_str(
        "<form action=\"/update\" method=\"get\">\
           <input type=\"url\" name=\"profile_url\" placeholder=\"Public profile URL\" size=\"60\">\
           <button type=\"submit\">Save</button>\
         </form>\
         <p><a href=\"/logout\">Log out</a></p>",
    );

    page("Badge Tracker", body)
}

fn render_badges(user: &User, progress: &[CurriculumProgress], fetch_failed: bool) -> String {
    let mut body = String::new();

    let _ = write!(body, "<h2>Badge progress for {}</h2>", escape_html(&user.name));

    if fetch_failed {
        body.push_str(
            "<p><em>The badge profile page could not be fetched; \
             progress below may be incomplete.</em></p>",
        );
    }

    for track in progress {
        let _ = write!(
            body,
            "<h3>{} ({}/{})</h3><ul>",
            escape_html(&track.track),
            track.completed_count(),
            track.total_count()
        );
        for badge in &track.badges {
            let mark = if badge.completed { "✅" } else { "⬜" };
            let _ = write!(body, "<li>{} {}</li>", mark, escape_html(&badge.name));
        }
        body.push_str("</ul>");
    }

    body.push_str("<p><a href=\"/\">Back</a></p>");

    page("Badge Progress", body)
}

fn page(title: &str, body: String) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        escape_html(title),
        escape_html(title),
        body
    )
}

/// Minimal HTML escaping for user-controlled values.
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CurriculumService;

    fn test_user(profile_url: Option<&str>) -> User {
        User {
            subject_id: "sub-1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            picture: None,
            profile_url: profile_url.map(String::from),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            last_login: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")&</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&amp;&lt;/script&gt;"
        );
    }

    #[test]
    fn summary_shows_profile_url_when_set() {
        let html = render_summary(&test_user(Some("https://example.com/p/abc")));
        assert!(html.contains("https://example.com/p/abc"));
        assert!(html.contains("/badges"));
        assert!(html.contains("/logout"));
    }

    #[test]
    fn summary_without_profile_url() {
        let html = render_summary(&test_user(None));
        assert!(html.contains("No badge profile URL set yet."));
    }

    #[test]
    fn badges_page_shows_counts_and_notice() {
        let curricula = CurriculumService::new();
        let progress = curricula.classify(&["Machine Learning APIs".to_string()]);

        let html = render_badges(&test_user(Some("https://x")), &progress, true);
        assert!(html.contains("Machine Learning (1/8)"));
        assert!(html.contains("could not be fetched"));
    }
}
