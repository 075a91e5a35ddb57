//! Question bank generation.
//!
//! One backend call per interview. Output is accepted when it holds at least one
//! usable question; a short bank is logged, never padded or retried.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::prompts::{QUESTION_PERSONA, QUESTION_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{json_system, VOICE_SAFE_INSTRUCTION};
use crate::llm_client::{call_json, LlmBackend, RetryPolicy};
use crate::models::interview::{Interview, InterviewSpec};
use crate::store::InterviewStore;

/// Either a bare array or an object wrapping one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionOutput {
    List(Vec<serde_json::Value>),
    Wrapped { questions: Vec<serde_json::Value> },
}

impl QuestionOutput {
    /// Non-blank string entries, trimmed, in the order given.
    fn into_questions(self) -> Vec<String> {
        let items = match self {
            QuestionOutput::List(items) => items,
            QuestionOutput::Wrapped { questions } => questions,
        };
        items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn build_question_prompt(spec: &InterviewSpec) -> String {
    QUESTION_PROMPT_TEMPLATE
        .replace("{role}", spec.role.trim())
        .replace("{level}", spec.level.as_str())
        .replace("{focus}", spec.interview_type.focus())
        .replace("{techstack}", &spec.techstack.join(", "))
        .replace("{amount}", &spec.amount.to_string())
        .replace("{voice_rules}", VOICE_SAFE_INSTRUCTION)
}

/// Asks the backend for `spec.amount` questions.
pub async fn generate_questions(
    backend: &dyn LlmBackend,
    spec: &InterviewSpec,
) -> Result<Vec<String>, AppError> {
    let prompt = build_question_prompt(spec);
    let output: QuestionOutput = call_json(
        backend,
        &prompt,
        &json_system(QUESTION_PERSONA),
        RetryPolicy::Once,
    )
    .await
    .map_err(|e| AppError::GenerationFailed(e.to_string()))?;

    let questions = output.into_questions();
    if questions.is_empty() {
        return Err(AppError::GenerationFailed(
            "backend returned no usable questions".to_string(),
        ));
    }

    if questions.len() < spec.amount as usize {
        warn!(
            "Requested {} questions for '{}', backend returned {}",
            spec.amount,
            spec.role,
            questions.len()
        );
    }
    Ok(questions)
}

/// Validates, generates and persists a new interview. Nothing is stored on failure.
pub async fn create_interview(
    store: &dyn InterviewStore,
    backend: &dyn LlmBackend,
    spec: InterviewSpec,
    user_id: String,
) -> Result<Interview, AppError> {
    spec.validate()?;
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("userId cannot be empty".to_string()));
    }

    let questions = generate_questions(backend, &spec).await?;
    let interview = Interview::new(spec, user_id, questions);
    store.insert_interview(&interview).await?;

    info!(
        "Created interview {} for user {} ({} questions, budget {})",
        interview.id,
        interview.user_id,
        interview.questions.len(),
        interview.amount
    );
    Ok(interview)
}
