// SPDX-License-Identifier: MIT

//! Secret Manager access for the OAuth client credential.
//!
//! Uses the official google-cloud-secretmanager-v1 SDK. Called once at
//! startup; a failure here is fatal to the process.

use google_cloud_gax::error::rpc::Code;

/// Secret Manager access errors.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Permission denied accessing secret: {0}")]
    PermissionDenied(String),

    #[error("Secret payload is not valid UTF-8: {0}")]
    Payload(String),

    #[error("Secret Manager error: {0}")]
    Backend(String),
}

/// Resolves named secrets from Secret Manager.
pub struct SecretProvider {
    project_id: String,
}

impl SecretProvider {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
        }
    }

    /// Fetch and decode a secret version as text.
    ///
    /// Pass `"latest"` as the version unless a pinned version is required.
    pub async fn access(&self, name: &str, version: &str) -> Result<String, SecretError> {
        use google_cloud_secretmanager_v1::client::SecretManagerService;

        let client = SecretManagerService::builder()
            .build()
            .await
            .map_err(|e| SecretError::Backend(format!("Secret Manager client error: {}", e)))?;

        let resource = format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, name, version
        );

        let response = client
            .access_secret_version()
            .set_name(&resource)
            .send()
            .await
            .map_err(|e| classify_error(&resource, e))?;

        let payload = response
            .payload
            .ok_or_else(|| SecretError::Backend(format!("empty payload for {}", resource)))?;

        String::from_utf8(payload.data.to_vec())
            .map_err(|e| SecretError::Payload(format!("{}: {}", resource, e)))
    }
}

/// Map a gRPC status onto the error taxonomy.
fn classify_error(resource: &str, err: google_cloud_gax::error::Error) -> SecretError {
    match err.status().map(|s| s.code) {
        Some(Code::NotFound) => SecretError::NotFound(resource.to_string()),
        Some(Code::PermissionDenied) => SecretError::PermissionDenied(resource.to_string()),
        _ => SecretError::Backend(format!("{}: {}", resource, err)),
    }
}
