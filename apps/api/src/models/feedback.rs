use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed scoring categories. Backend output must score every one of them.
pub const CATEGORIES: [&str; 5] = [
    "Communication Skills",
    "Technical Knowledge",
    "Problem Solving",
    "Cultural & Role Fit",
    "Confidence & Clarity",
];

/// Scored result of one interview for one user. At most one per (interview, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub interview_id: Uuid,
    pub user_id: String,
    /// 0 – 100
    pub total_score: u8,
    pub category_scores: BTreeMap<String, u8>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
    pub created_at: DateTime<Utc>,
}
