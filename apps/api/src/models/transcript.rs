use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::interview::BaseQuestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    #[serde(alias = "assistant")]
    Interviewer,
    #[serde(alias = "user")]
    Candidate,
    /// Client instructions carried in chat-style transcripts. Never drives a decision.
    System,
}

/// One entry of the append-only transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub role: Speaker,
    #[serde(alias = "content")]
    pub text: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Set on interviewer turns that presented a base question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_ordinal: Option<u32>,
}

impl ConversationTurn {
    pub fn interviewer(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Interviewer,
            text: text.into(),
            timestamp: Utc::now(),
            base_ordinal: None,
        }
    }

    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Candidate,
            text: text.into(),
            timestamp: Utc::now(),
            base_ordinal: None,
        }
    }

    pub fn presenting(question: &BaseQuestion) -> Self {
        Self {
            base_ordinal: Some(question.ordinal),
            ..Self::interviewer(question.text.clone())
        }
    }

    pub fn presents_base_question(&self) -> bool {
        self.role == Speaker::Interviewer && self.base_ordinal.is_some()
    }
}

pub fn has_candidate_turn(transcript: &[ConversationTurn]) -> bool {
    transcript.iter().any(|t| t.role == Speaker::Candidate)
}

/// Who spoke last, skipping system turns.
pub fn last_speaker(transcript: &[ConversationTurn]) -> Option<Speaker> {
    transcript
        .iter()
        .rev()
        .map(|t| t.role)
        .find(|role| *role != Speaker::System)
}

/// Renders the transcript as the bullet list embedded in prompts. System turns are left out.
pub fn render_transcript(transcript: &[ConversationTurn]) -> String {
    transcript
        .iter()
        .filter_map(|turn| {
            let speaker = match turn.role {
                Speaker::Interviewer => "interviewer",
                Speaker::Candidate => "candidate",
                Speaker::System => return None,
            };
            Some(format!("- {speaker}: {}", turn.text.trim()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
