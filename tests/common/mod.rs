// SPDX-License-Identifier: MIT

use badge_tracker::config::Config;
use badge_tracker::db::FirestoreDb;
use badge_tracker::routes::create_router;
use badge_tracker::services::oauth::DiscoveryDocument;
use badge_tracker::services::{BadgeService, CurriculumService, GoogleOAuthClient};
use badge_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Fixed OIDC endpoints so tests never hit the network for discovery.
#[allow(dead_code)]
pub fn test_endpoints() -> DiscoveryDocument {
    DiscoveryDocument {
        authorization_endpoint: "https://accounts.example.com/o/oauth2/auth".to_string(),
        token_endpoint: "https://oauth2.example.com/token".to_string(),
        userinfo_endpoint: "https://openidconnect.example.com/v1/userinfo".to_string(),
    }
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(test_db_offline(), test_endpoints())
}

/// Create a test app with an explicit store and OIDC endpoints.
///
/// Used by the callback flow tests to point the OAuth client at a local
/// stand-in provider and assert against a real (emulator) store.
#[allow(dead_code)]
pub fn create_test_app_with(
    db: FirestoreDb,
    endpoints: DiscoveryDocument,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let oauth = GoogleOAuthClient::new_with_endpoints(
        config.oauth_client_id.clone(),
        config.oauth_client_secret.clone(),
        endpoints,
    )
    .expect("Failed to build test OAuth client");

    let state = Arc::new(AppState {
        config,
        db,
        oauth,
        badges: BadgeService::new().expect("Failed to build badge HTTP client"),
        curricula: CurriculumService::new(),
    });

    (create_router(state.clone()), state)
}
