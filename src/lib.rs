// SPDX-License-Identifier: MIT

//! Badge-Tracker: follow Google Cloud Skills Boost learning tracks.
//!
//! This crate provides the backend for signing users in with Google,
//! scraping their public Skills Boost profile page, and classifying
//! completed badges against the fixed learning-track curricula.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{BadgeService, CurriculumService, GoogleOAuthClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub oauth: GoogleOAuthClient,
    pub badges: BadgeService,
    pub curricula: CurriculumService,
}
