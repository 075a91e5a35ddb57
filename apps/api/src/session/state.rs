use uuid::Uuid;

use crate::models::interview::{BaseQuestion, Interview};
use crate::models::transcript::ConversationTurn;
use crate::session::budget::{next_base_ordinal, remaining_budget};
use crate::session::engine::Decision;

/// Ephemeral view of a live session, rebuilt from the interview and transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub interview_id: Uuid,
    pub transcript: Vec<ConversationTurn>,
    pub remaining_budget: u32,
    pub next_base_ordinal: u32,
}

impl SessionState {
    pub fn reconstruct(interview: &Interview, transcript: Vec<ConversationTurn>) -> Self {
        Self {
            interview_id: interview.id,
            remaining_budget: remaining_budget(interview.amount, &transcript),
            next_base_ordinal: next_base_ordinal(&transcript),
            transcript,
        }
    }

    pub fn next_base_question<'a>(&self, interview: &'a Interview) -> Option<&'a BaseQuestion> {
        interview.question(self.next_base_ordinal)
    }

    /// Applies a decision as one step: append the turn, then move budget and cursor.
    /// Returns `false` once the session has ended.
    pub fn apply(&mut self, decision: &Decision) -> bool {
        match decision {
            Decision::End => false,
            Decision::PresentBase(question) => {
                self.transcript.push(ConversationTurn::presenting(question));
                self.remaining_budget = self.remaining_budget.saturating_sub(1);
                self.next_base_ordinal = question.ordinal + 1;
                true
            }
            Decision::PresentFollowUp(text) => {
                self.transcript.push(ConversationTurn::interviewer(text.clone()));
                true
            }
        }
    }
}
