// SPDX-License-Identifier: MIT

//! Static learning-track curricula and badge classification.
//!
//! Three fixed, ordered curricula compiled into the binary; classification
//! is an exact case-sensitive intersection against the scraped badge set.

use serde::Serialize;
use std::collections::HashSet;

/// Badges making up the cloud architecture track, in track order.
const ARCHITECTURE_TRACK: &[&str] = &[
    "Create and Manage Cloud Resources",
    "Perform Foundational Infrastructure Tasks in Google Cloud",
    "Set Up and Configure a Cloud Environment in Google Cloud",
    "Automating Infrastructure on Google Cloud with Terraform",
    "Build and Secure Networks in Google Cloud",
    "Optimize Costs for Google Kubernetes Engine",
    "Cloud Architecture: Design, Implement, and Manage",
    "Deploy and Manage Cloud Environments with Google Cloud",
];

/// Badges making up the cloud development track, in track order.
const DEVELOPMENT_TRACK: &[&str] = &[
    "Google Cloud Essentials",
    "Create and Manage Cloud Resources",
    "Perform Foundational Application Infrastructure Tasks",
    "Deploy to Kubernetes in Google Cloud",
    "Serverless Cloud Run Development",
    "Serverless Firebase Development",
    "Cloud Development",
    "Application Development: Python",
];

/// Badges making up the machine learning track, in track order.
const MACHINE_LEARNING_TRACK: &[&str] = &[
    "Perform Foundational Data, ML, and AI Tasks in Google Cloud",
    "Machine Learning APIs",
    "Intro to ML: Language Processing",
    "Intro to ML: Image Processing",
    "Integrate with Machine Learning APIs",
    "Create ML Models with BigQuery ML",
    "Build and Deploy Machine Learning Solutions on Vertex AI",
    "Explore Machine Learning Models with Explainable AI",
];

/// One learning track: an ordered list of canonical badge names.
#[derive(Debug, Clone)]
pub struct Curriculum {
    pub name: &'static str,
    pub badges: &'static [&'static str],
}

/// Per-badge classification result.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeStatus {
    pub name: String,
    pub completed: bool,
}

/// Classification of one curriculum against a completed-badge set.
#[derive(Debug, Clone, Serialize)]
pub struct CurriculumProgress {
    pub track: String,
    pub badges: Vec<BadgeStatus>,
}

impl CurriculumProgress {
    pub fn completed_count(&self) -> usize {
        self.badges.iter().filter(|b| b.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.badges.len()
    }
}

/// Holds the three static curricula, loaded once at startup.
#[derive(Clone)]
pub struct CurriculumService {
    tracks: Vec<Curriculum>,
}

impl Default for CurriculumService {
    fn default() -> Self {
        Self {
            tracks: vec![
                Curriculum {
                    name: "Cloud Architecture",
                    badges: ARCHITECTURE_TRACK,
                },
                Curriculum {
                    name: "Cloud Development",
                    badges: DEVELOPMENT_TRACK,
                },
                Curriculum {
                    name: "Machine Learning",
                    badges: MACHINE_LEARNING_TRACK,
                },
            ],
        }
    }
}

impl CurriculumService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Curriculum] {
        &self.tracks
    }

    /// Classify a completed-badge sequence against every curriculum.
    ///
    /// Exact, case-sensitive string match; curriculum order is preserved
    /// in the output. Pure and display-only.
    pub fn classify(&self, completed: &[String]) -> Vec<CurriculumProgress> {
        let completed: HashSet<&str> = completed.iter().map(String::as_str).collect();

        self.tracks
            .iter()
            .map(|curriculum| CurriculumProgress {
                track: curriculum.name.to_string(),
                badges: curriculum
                    .badges
                    .iter()
                    .map(|&name| BadgeStatus {
                        name: name.to_string(),
                        completed: completed.contains(name),
                    })
                    .collect(),
            })
            .collect()
    }
}
