// SPDX-License-Identifier: MIT

//! Badge-Tracker server
//!
//! Signs users in with Google, stores a minimal profile record, and
//! classifies scraped Skills Boost badges against the learning tracks.

use badge_tracker::{
    config::Config,
    db::FirestoreDb,
    services::{BadgeService, CurriculumService, GoogleOAuthClient, SecretProvider},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    dotenvy::dotenv().ok();

    // Load configuration; any secret-retrieval failure here is fatal.
    let config = if std::env::var("GOOGLE_CLIENT_ID").is_ok() {
        Config::from_env().expect("Failed to load configuration")
    } else {
        let project_id =
            std::env::var("GCP_PROJECT_ID").expect("GCP_PROJECT_ID must be set");
        let secrets = SecretProvider::new(&project_id);
        Config::load_with_secrets(&secrets)
            .await
            .expect("Failed to load configuration from Secret Manager")
    };
    tracing::info!(port = config.port, "Starting Badge-Tracker");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize the Google OAuth client
    let oauth = GoogleOAuthClient::new(
        config.oauth_client_id.clone(),
        config.oauth_client_secret.clone(),
    )
    .expect("Failed to initialize OAuth client");
    tracing::info!("OAuth client initialized");

    // Load static curricula
    let curricula = CurriculumService::new();
    tracing::info!(count = curricula.tracks().len(), "Curricula loaded");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        oauth,
        badges: BadgeService::new().expect("Failed to initialize badge HTTP client"),
        curricula,
    });

    // Build router
    let app = badge_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("badge_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
