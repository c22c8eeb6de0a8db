//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// OIDC subject id issued by Google (also used as document ID)
    pub subject_id: String,
    /// Display name
    pub name: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Profile picture URL
    pub picture: Option<String>,
    /// Public Skills Boost profile URL, set later via /update
    pub profile_url: Option<String>,
    /// When user first signed in
    pub created_at: String,
    /// Last login timestamp
    pub last_login: String,
}

impl User {
    /// Build a fresh record from a normalized OIDC profile.
    pub fn from_oidc_profile(profile: &crate::services::oauth::UserInfo, now: &str) -> Self {
        Self {
            subject_id: profile.sub.clone(),
            name: profile.name.clone().unwrap_or_default(),
            email: profile.email.clone(),
            picture: profile.picture.clone(),
            profile_url: None,
            created_at: now.to_string(),
            last_login: now.to_string(),
        }
    }
}
