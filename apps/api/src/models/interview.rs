use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

pub const MIN_ROLE_CHARS: usize = 2;
pub const MAX_QUESTION_AMOUNT: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Junior,
    Midlevel,
    Senior,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Junior => "junior",
            Level::Midlevel => "midlevel",
            Level::Senior => "senior",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junior" => Ok(Level::Junior),
            "midlevel" => Ok(Level::Midlevel),
            "senior" => Ok(Level::Senior),
            other => Err(format!("unknown level '{other}'")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Behavioral,
    #[default]
    Mixed,
    Technical,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Behavioral => "behavioral",
            InterviewType::Mixed => "mixed",
            InterviewType::Technical => "technical",
        }
    }

    /// Focus line used when prompting for questions.
    pub fn focus(&self) -> &'static str {
        match self {
            InterviewType::Behavioral => "behavioural questions only",
            InterviewType::Mixed => "a balance between behavioural and technical questions",
            InterviewType::Technical => "technical questions only",
        }
    }
}

impl FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "behavioral" => Ok(InterviewType::Behavioral),
            "mixed" => Ok(InterviewType::Mixed),
            "technical" => Ok(InterviewType::Technical),
            other => Err(format!("unknown interview type '{other}'")),
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters the question bank is generated from. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSpec {
    pub role: String,
    #[serde(default)]
    pub level: Level,
    #[serde(rename = "type", default)]
    pub interview_type: InterviewType,
    pub amount: u32,
    #[serde(deserialize_with = "deserialize_techstack")]
    pub techstack: Vec<String>,
}

impl InterviewSpec {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.role.trim().chars().count() < MIN_ROLE_CHARS {
            return Err(AppError::Validation(format!(
                "role must be at least {MIN_ROLE_CHARS} characters"
            )));
        }
        if !(1..=MAX_QUESTION_AMOUNT).contains(&self.amount) {
            return Err(AppError::Validation(format!(
                "amount must be between 1 and {MAX_QUESTION_AMOUNT}"
            )));
        }
        if self.techstack.is_empty() {
            return Err(AppError::Validation(
                "techstack must contain at least one technology".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accepts either a JSON list or a comma-separated string; blanks are dropped.
fn deserialize_techstack<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TechstackInput {
        List(Vec<String>),
        Csv(String),
    }

    let items = match TechstackInput::deserialize(deserializer)? {
        TechstackInput::List(items) => items,
        TechstackInput::Csv(raw) => raw.split(',').map(str::to_string).collect(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// A pre-generated question. Consumed at most once per session, tracked by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseQuestion {
    pub text: String,
    pub ordinal: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: Uuid,
    pub user_id: String,
    pub role: String,
    pub level: Level,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub techstack: Vec<String>,
    /// Question budget agreed at creation.
    pub amount: u32,
    pub questions: Vec<BaseQuestion>,
    pub created_at: DateTime<Utc>,
}

impl Interview {
    /// Assembles a new interview; ordinals follow the order the texts were given in.
    pub fn new(spec: InterviewSpec, user_id: String, question_texts: Vec<String>) -> Self {
        let questions = question_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| BaseQuestion {
                text,
                ordinal: i as u32,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            user_id,
            role: spec.role.trim().to_string(),
            level: spec.level,
            interview_type: spec.interview_type,
            techstack: spec.techstack,
            amount: spec.amount,
            questions,
            created_at: Utc::now(),
        }
    }

    pub fn question(&self, ordinal: u32) -> Option<&BaseQuestion> {
        self.questions.iter().find(|q| q.ordinal == ordinal)
    }
}
