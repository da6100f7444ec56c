//! Result summary of a finished session, with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::AnswerRecord;
use crate::scoring::SectionScore;

/// Why a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The candidate advanced past the last question.
    Completed,
    /// The time budget ran out.
    TimeExpired,
}

/// What a finished session hands to the reporting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub session_id: Uuid,
    pub assessment_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub termination: Termination,
    pub answers: AnswerRecord,
    /// In section order.
    pub section_scores: Vec<SectionScore>,
    /// Rounded mean of the section percentages.
    pub overall_score: u32,
}

impl AssessmentResult {
    /// Percentage for `section`, if it exists.
    pub fn section_percentage(&self, section: &str) -> Option<f64> {
        self.section_scores
            .iter()
            .find(|s| s.section == section)
            .map(|s| s.percentage)
    }

    /// Save the result as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read result from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse result JSON")
    }
}
