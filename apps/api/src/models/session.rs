use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::transcript::ConversationTurn;

/// Lifecycle of one candidate session: created → in_progress → ended → scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// In memory only, between `SessionRecord::new` and the first decision.
    /// A stored session is never `Created`: starting a session saves it after
    /// that decision moves it on.
    Created,
    InProgress,
    Ended,
    Scored,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Ended => "ended",
            SessionStatus::Scored => "scored",
        }
    }

    /// No further questions may be presented once terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Ended | SessionStatus::Scored)
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(SessionStatus::Created),
            "in_progress" => Ok(SessionStatus::InProgress),
            "ended" => Ok(SessionStatus::Ended),
            "scored" => Ok(SessionStatus::Scored),
            other => Err(format!("unknown session status '{other}'")),
        }
    }
}

/// Durable part of a session. Budget and cursor are derived from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub interview_id: Uuid,
    pub user_id: String,
    pub status: SessionStatus,
    pub transcript: Vec<ConversationTurn>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(interview_id: Uuid, user_id: String) -> Self {
        Self {
            interview_id,
            user_id,
            status: SessionStatus::Created,
            transcript: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SessionStatus::Created.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
        assert!(SessionStatus::Ended.is_terminal());
        assert!(SessionStatus::Scored.is_terminal());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(
            "in_progress".parse::<SessionStatus>().unwrap(),
            SessionStatus::InProgress
        );
    }
}
