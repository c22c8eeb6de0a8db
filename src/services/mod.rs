// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod badges;
pub mod curriculum;
pub mod oauth;
pub mod secrets;

pub use badges::BadgeService;
pub use curriculum::{BadgeStatus, CurriculumProgress, CurriculumService};
pub use oauth::GoogleOAuthClient;
pub use secrets::{SecretError, SecretProvider};
