// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations for user records.

use crate::db::collections;
use crate::error::AppError;
use crate::models::User;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by OIDC subject id. Absence is not an error.
    pub async fn get_user(&self, subject_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(subject_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create (or overwrite) a user record keyed by subject id.
    ///
    /// Callers that want first-login-only semantics must check `get_user`
    /// first, otherwise a stored `profile_url` would be clobbered.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.subject_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Set the Skills Boost profile URL on an existing user record.
    ///
    /// Read-modify-write so that only the targeted field changes; fails
    /// with NotFound if the record does not exist. Concurrent updates are
    /// last-write-wins.
    pub async fn update_profile_url(
        &self,
        subject_id: &str,
        profile_url: &str,
    ) -> Result<User, AppError> {
        let mut user = self
            .get_user(subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", subject_id)))?;

        user.profile_url = Some(profile_url.to_string());
        self.create_user(&user).await?;
        Ok(user)
    }

    /// Record a login on an existing user, preserving all other fields.
    pub async fn touch_last_login(&self, subject_id: &str, now: &str) -> Result<(), AppError> {
        if let Some(mut user) = self.get_user(subject_id).await? {
            user.last_login = now.to_string();
            self.create_user(&user).await?;
        }
        Ok(())
    }
}
