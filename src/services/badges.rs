// SPDX-License-Identifier: MIT

//! Badge extraction from public Skills Boost profile pages.
//!
//! Fetches the user-supplied page with a plain unauthenticated GET and
//! pulls the text of every element matching the badge-title selector.

use crate::error::AppError;
use anyhow::Context;
use scraper::{Html, Selector};
use std::time::Duration;

/// Class selector for badge titles on a Skills Boost public profile.
const BADGE_SELECTOR: &str = ".ql-title-medium";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches and parses badge profile pages.
#[derive(Clone)]
pub struct BadgeService {
    http: reqwest::Client,
}

impl BadgeService {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("failed building badge HTTP client")?;
        Ok(Self { http })
    }

    /// Fetch a profile page and extract completed badge names.
    ///
    /// An unreachable page or non-success status is a `Scrape` error so
    /// callers can tell "page unavailable" apart from "zero badges".
    pub async fn fetch_completed_badges(&self, url: &str) -> Result<Vec<String>, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Scrape(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Scrape(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Scrape(format!("{}: {}", url, e)))?;

        Ok(extract_badges(&body))
    }
}

/// Extract badge names from profile-page HTML.
///
/// Returns trimmed text of every matching element in document order.
/// No deduplication; zero matches yields an empty vec.
pub fn extract_badges(html: &str) -> Vec<String> {
    let selector = Selector::parse(BADGE_SELECTOR).expect("badge selector is valid");

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_timeout() {
        assert!(BadgeService::new().is_ok());
    }

    const PROFILE_FIXTURE: &str = r#"
        <html><body>
          <div class="profile-badges">
            <div class="profile-badge">
              <span class="ql-title-medium l-mts">
                Create and Manage Cloud Resources
              </span>
            </div>
            <div class="profile-badge">
              <span class="ql-title-medium l-mts">Machine Learning APIs</span>
            </div>
            <div class="profile-badge">
              <span class="ql-title-medium l-mts">
                  Deploy to Kubernetes in Google Cloud
              </span>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn extracts_badges_in_document_order() {
        let badges = extract_badges(PROFILE_FIXTURE);

        assert_eq!(
            badges,
            vec![
                "Create and Manage Cloud Resources",
                "Machine Learning APIs",
                "Deploy to Kubernetes in Google Cloud",
            ]
        );
    }

    #[test]
    fn no_matching_elements_yields_empty() {
        let html = "<html><body><h1>Profile</h1><p>No badges here.</p></body></html>";
        assert!(extract_badges(html).is_empty());
    }

    #[test]
    fn duplicate_badges_are_kept() {
        let html = r#"
            <span class="ql-title-medium">Machine Learning APIs</span>
            <span class="ql-title-medium">Machine Learning APIs</span>
        "#;
        let badges = extract_badges(html);
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0], badges[1]);
    }

    #[test]
    fn whitespace_only_elements_are_skipped() {
        let html = r#"
            <span class="ql-title-medium">   </span>
            <span class="ql-title-medium">Serverless Cloud Run Development</span>
        "#;
        assert_eq!(
            extract_badges(html),
            vec!["Serverless Cloud Run Development"]
        );
    }

    #[test]
    fn malformed_html_still_parses() {
        let html = r#"<div><span class="ql-title-medium">Google Cloud Essentials</div>"#;
        assert_eq!(extract_badges(html), vec!["Google Cloud Essentials"]);
    }
}
