//! Follow-up advisor: asks the backend whether to dig into the last answer.
//!
//! Disabled unless `ENABLE_FOLLOW_UPS` is set. Its output is validated into a
//! `Decision`; any backend or schema fault comes back as `GenerationUnavailable`.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{parse_json, LlmBackend, RetryPolicy};
use crate::models::interview::{BaseQuestion, Interview};
use crate::models::transcript::{last_speaker, render_transcript, ConversationTurn, Speaker};
use crate::session::budget::follow_ups_since_last_base;
use crate::session::engine::{budget_exhausted, Decision};
use crate::session::prompts::{FOLLOW_UP_PERSONA, FOLLOW_UP_PROMPT_TEMPLATE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Action {
    Base,
    #[serde(alias = "follow_up", alias = "follow-up")]
    Followup,
    End,
}

#[derive(Debug, Deserialize)]
struct Advice {
    action: Action,
    #[serde(default)]
    question: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum AdviceViolation {
    #[error("follow-up action without a question")]
    MissingQuestion,
}

fn advice_to_decision(
    advice: Advice,
    next_base: Option<&BaseQuestion>,
) -> Result<Decision, AdviceViolation> {
    match advice.action {
        Action::End => Ok(Decision::End),
        Action::Base => Ok(next_base
            .cloned()
            .map_or(Decision::End, Decision::PresentBase)),
        Action::Followup => advice
            .question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .map(Decision::PresentFollowUp)
            .ok_or(AdviceViolation::MissingQuestion),
    }
}

pub struct FollowUpAdvisor {
    backend: Arc<dyn LlmBackend>,
    max_per_question: usize,
}

impl FollowUpAdvisor {
    pub fn new(backend: Arc<dyn LlmBackend>, max_per_question: usize) -> Self {
        Self {
            backend,
            max_per_question,
        }
    }

    /// Only a fresh candidate answer, with budget left and the cap not yet hit, is worth a call.
    pub fn should_consult(
        &self,
        transcript: &[ConversationTurn],
        remaining_budget: Option<i64>,
    ) -> bool {
        !budget_exhausted(remaining_budget)
            && last_speaker(transcript) == Some(Speaker::Candidate)
            && follow_ups_since_last_base(transcript) < self.max_per_question
    }

    pub async fn consult(
        &self,
        interview: Option<&Interview>,
        transcript: &[ConversationTurn],
        next_base: Option<&BaseQuestion>,
    ) -> Result<Decision, AppError> {
        let prompt = build_follow_up_prompt(interview, transcript, next_base);

        // Not retried: a repeated call could present a duplicate question.
        let text = self
            .backend
            .complete(&prompt, &json_system(FOLLOW_UP_PERSONA), RetryPolicy::None)
            .await
            .map_err(|e| AppError::GenerationUnavailable(format!("Follow-up call failed: {e}")))?;

        let advice: Advice = parse_json(&text).map_err(|e| {
            AppError::GenerationUnavailable(format!("Follow-up output unreadable: {e}"))
        })?;

        let decision = advice_to_decision(advice, next_base)
            .map_err(|e| AppError::GenerationUnavailable(format!("Follow-up output invalid: {e}")))?;

        info!("Follow-up advisor chose {}", decision.kind());
        Ok(decision)
    }
}

fn build_follow_up_prompt(
    interview: Option<&Interview>,
    transcript: &[ConversationTurn],
    next_base: Option<&BaseQuestion>,
) -> String {
    let interview_context = match interview {
        Some(i) => format!(
            "INTERVIEW: {} {} role, {} interview. Tech stack: {}.",
            i.level,
            i.role,
            i.interview_type,
            i.techstack.join(", ")
        ),
        None => "INTERVIEW: general practice interview.".to_string(),
    };

    FOLLOW_UP_PROMPT_TEMPLATE
        .replace("{interview_context}", &interview_context)
        .replace(
            "{next_base_question}",
            next_base.map_or("none", |q| q.text.as_str()),
        )
        .replace("{transcript}", &render_transcript(transcript))
}
