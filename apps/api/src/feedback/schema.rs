//! Strict validation of scoring output.
//!
//! The backend is untrusted: its text becomes a `ScoringOutput` only if every
//! field passes. Failures are returned as a `SchemaViolation`, never defaulted.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::llm_client::parse_json;
use crate::models::feedback::CATEGORIES;

const MAX_SCORE: i64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("output is not the expected JSON object: {0}")]
    NotJson(String),

    #[error("{field} must be between 0 and {MAX_SCORE}, got {value}")]
    ScoreOutOfRange { field: String, value: i64 },

    #[error("category '{0}' is missing")]
    MissingCategory(String),

    #[error("category '{0}' is not a scoring category")]
    UnknownCategory(String),

    #[error("category '{0}' is scored more than once")]
    DuplicateCategory(String),

    #[error("finalAssessment is empty")]
    EmptyAssessment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoringOutput {
    total_score: i64,
    category_scores: BTreeMap<String, i64>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    areas_for_improvement: Vec<String>,
    final_assessment: String,
}

/// Scoring output that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringOutput {
    pub total_score: u8,
    pub category_scores: BTreeMap<String, u8>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
}

fn score(field: &str, value: i64) -> Result<u8, SchemaViolation> {
    if (0..=MAX_SCORE).contains(&value) {
        Ok(value as u8)
    } else {
        Err(SchemaViolation::ScoreOutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn validate_scoring_output(text: &str) -> Result<ScoringOutput, SchemaViolation> {
    let raw: RawScoringOutput =
        parse_json(text).map_err(|e| SchemaViolation::NotJson(e.to_string()))?;

    let total_score = score("totalScore", raw.total_score)?;

    let mut category_scores = BTreeMap::new();
    for (name, value) in raw.category_scores {
        let name = name.trim().to_string();
        if !CATEGORIES.contains(&name.as_str()) {
            return Err(SchemaViolation::UnknownCategory(name));
        }
        let value = score(&name, value)?;
        if category_scores.insert(name.clone(), value).is_some() {
            return Err(SchemaViolation::DuplicateCategory(name));
        }
    }
    if let Some(missing) = CATEGORIES
        .iter()
        .find(|c| !category_scores.contains_key(**c))
    {
        return Err(SchemaViolation::MissingCategory(missing.to_string()));
    }

    let final_assessment = raw.final_assessment.trim().to_string();
    if final_assessment.is_empty() {
        return Err(SchemaViolation::EmptyAssessment);
    }

    Ok(ScoringOutput {
        total_score,
        category_scores,
        strengths: non_blank(raw.strengths),
        areas_for_improvement: non_blank(raw.areas_for_improvement),
        final_assessment,
    })
}
