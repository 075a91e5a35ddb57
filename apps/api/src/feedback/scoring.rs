//! Feedback scoring pipeline.
//!
//! transcript check → prompt → one backend call → strict schema → upsert.
//! Nothing is persisted unless every step succeeds.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::prompts::{SCORING_PERSONA, SCORING_PROMPT_TEMPLATE};
use crate::feedback::schema::validate_scoring_output;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{LlmBackend, RetryPolicy};
use crate::models::feedback::{Feedback, CATEGORIES};
use crate::models::interview::Interview;
use crate::models::session::{SessionRecord, SessionStatus};
use crate::models::transcript::{has_candidate_turn, render_transcript, ConversationTurn};
use crate::session::service::load_interview;
use crate::state::AppState;

fn build_scoring_prompt(interview: &Interview, transcript: &[ConversationTurn]) -> String {
    let categories = CATEGORIES
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");

    SCORING_PROMPT_TEMPLATE
        .replace("{role}", &interview.role)
        .replace("{level}", interview.level.as_str())
        .replace("{interview_type}", interview.interview_type.as_str())
        .replace("{techstack}", &interview.techstack.join(", "))
        .replace("{categories}", &categories)
        .replace("{transcript}", &render_transcript(transcript))
}

/// Scores one transcript. Does not touch storage.
pub async fn score(
    backend: &dyn LlmBackend,
    interview: &Interview,
    user_id: &str,
    transcript: &[ConversationTurn],
) -> Result<Feedback, AppError> {
    if !has_candidate_turn(transcript) {
        return Err(AppError::InsufficientTranscript);
    }

    let prompt = build_scoring_prompt(interview, transcript);

    // Not retried: the caller resubmits instead.
    let text = backend
        .complete(&prompt, &json_system(SCORING_PERSONA), RetryPolicy::None)
        .await
        .map_err(|e| AppError::GenerationUnavailable(format!("Scoring call failed: {e}")))?;

    let output = validate_scoring_output(&text).map_err(|violation| {
        warn!("Rejected scoring output for interview {}: {violation}", interview.id);
        AppError::MalformedScoringOutput(violation.to_string())
    })?;

    Ok(Feedback {
        interview_id: interview.id,
        user_id: user_id.to_string(),
        total_score: output.total_score,
        category_scores: output.category_scores,
        strengths: output.strengths,
        areas_for_improvement: output.areas_for_improvement,
        final_assessment: output.final_assessment,
        created_at: Utc::now(),
    })
}

/// Scores an interview for a user and records the result.
///
/// With no `transcript`, the stored session transcript is scored. A stored
/// session that is still running is never scored. Rescoring replaces the
/// earlier feedback.
pub async fn score_interview(
    state: &AppState,
    interview_id: Uuid,
    user_id: &str,
    transcript: Option<Vec<ConversationTurn>>,
) -> Result<Feedback, AppError> {
    let interview = load_interview(state, interview_id).await?;
    let _guard = state.locks.acquire(interview_id).await;

    let existing = state.store.get_session(interview_id, user_id).await?;
    if let Some(session) = &existing {
        if !session.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Session is {}; end it before requesting feedback",
                session.status.as_str()
            )));
        }
    }

    let mut record = match (existing, transcript) {
        (_, Some(supplied)) => {
            let mut record = SessionRecord::new(interview_id, user_id.to_string());
            record.transcript = supplied;
            record
        }
        (Some(stored), None) => stored,
        (None, None) => return Err(AppError::InsufficientTranscript),
    };

    let feedback = score(state.llm.as_ref(), &interview, user_id, &record.transcript).await?;

    record.status = SessionStatus::Scored;
    record.updated_at = Utc::now();
    state.store.record_score(&feedback, &record).await?;

    info!(
        "Scored interview {interview_id} for user {user_id}: {} ({} turns)",
        feedback.total_score,
        record.transcript.len()
    );
    Ok(feedback)
}
