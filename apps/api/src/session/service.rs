//! Server-held sessions: start, answer, end.
//!
//! Every mutation runs under the interview's lock, so two overlapping requests
//! can never observe the same budget and present a question twice.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::Interview;
use crate::models::session::{SessionRecord, SessionStatus};
use crate::models::transcript::{ConversationTurn, Speaker};
use crate::session::budget::remaining_budget;
use crate::session::engine::Decision;
use crate::session::state::SessionState;
use crate::state::AppState;

pub const GREETING: &str =
    "Hello! Thanks for taking the time to practise with me today. Let's get started.";

/// What the caller needs to render the next step.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub status: SessionStatus,
    pub decision: Decision,
    pub remaining_budget: u32,
    pub transcript: Vec<ConversationTurn>,
}

impl SessionView {
    fn of(record: &SessionRecord, interview: &Interview, decision: Decision) -> Self {
        Self {
            status: record.status,
            decision,
            remaining_budget: remaining_budget(interview.amount, &record.transcript),
            transcript: record.transcript.clone(),
        }
    }
}

pub(crate) async fn load_interview(state: &AppState, interview_id: Uuid) -> Result<Interview, AppError> {
    state
        .store
        .get_interview(interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))
}

async fn load_session(
    state: &AppState,
    interview_id: Uuid,
    user_id: &str,
) -> Result<SessionRecord, AppError> {
    state
        .store
        .get_session(interview_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No session for interview {interview_id} and user {user_id}"
            ))
        })
}

/// Decides the next step for `record` and applies it in place.
async fn advance(
    state: &AppState,
    interview: &Interview,
    record: &mut SessionRecord,
) -> Result<Decision, AppError> {
    let mut session = SessionState::reconstruct(interview, std::mem::take(&mut record.transcript));
    let next_base = session.next_base_question(interview);

    let outcome = state
        .turn_policy
        .decide(
            Some(interview),
            &session.transcript,
            next_base,
            Some(i64::from(session.remaining_budget)),
        )
        .await;

    let decision = match outcome {
        Ok(decision) => decision,
        Err(e) => {
            record.transcript = session.transcript;
            return Err(e);
        }
    };

    let continues = session.apply(&decision);
    record.transcript = session.transcript;
    record.status = if continues {
        SessionStatus::InProgress
    } else {
        SessionStatus::Ended
    };
    record.updated_at = Utc::now();

    info!(
        "Interview {} user {}: decided {} (remaining budget {})",
        interview.id,
        record.user_id,
        decision.kind(),
        session.remaining_budget
    );
    Ok(decision)
}

/// The prompt currently in front of the candidate, read back from the transcript.
fn current_prompt(record: &SessionRecord, interview: &Interview) -> Decision {
    if record.status.is_terminal() {
        return Decision::End;
    }
    match record.transcript.iter().rev().find(|t| t.role == Speaker::Interviewer) {
        Some(turn) => match turn.base_ordinal.and_then(|o| interview.question(o)) {
            Some(question) => Decision::PresentBase(question.clone()),
            None => Decision::PresentFollowUp(turn.text.clone()),
        },
        None => Decision::End,
    }
}

/// Starts a session, or returns the live one unchanged when resubmitted.
pub async fn start_session(
    state: &AppState,
    interview_id: Uuid,
    user_id: &str,
) -> Result<SessionView, AppError> {
    let interview = load_interview(state, interview_id).await?;
    let _guard = state.locks.acquire(interview_id).await;

    if let Some(existing) = state.store.get_session(interview_id, user_id).await? {
        if existing.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Session for interview {interview_id} has already {}",
                existing.status.as_str()
            )));
        }
        let decision = current_prompt(&existing, &interview);
        return Ok(SessionView::of(&existing, &interview, decision));
    }

    let mut record = SessionRecord::new(interview_id, user_id.to_string());
    record.transcript.push(ConversationTurn::interviewer(GREETING));
    let decision = advance(state, &interview, &mut record).await?;
    state.store.save_session(&record).await?;

    info!("Started session for interview {interview_id}, user {user_id}");
    Ok(SessionView::of(&record, &interview, decision))
}

/// Records the candidate's answer and moves the session one step.
pub async fn submit_answer(
    state: &AppState,
    interview_id: Uuid,
    user_id: &str,
    text: &str,
    expected_turns: Option<usize>,
) -> Result<SessionView, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("Answer text cannot be empty".to_string()));
    }

    let interview = load_interview(state, interview_id).await?;
    let _guard = state.locks.acquire(interview_id).await;
    let mut record = load_session(state, interview_id, user_id).await?;

    if record.status != SessionStatus::InProgress {
        return Err(AppError::Conflict(format!(
            "Session is {}, not accepting answers",
            record.status.as_str()
        )));
    }
    if let Some(expected) = expected_turns {
        if expected != record.transcript.len() {
            return Err(AppError::Conflict(format!(
                "Transcript has {} turns, request expected {expected}",
                record.transcript.len()
            )));
        }
    }

    record.transcript.push(ConversationTurn::candidate(text.trim()));
    let decision = advance(state, &interview, &mut record).await?;
    state.store.save_session(&record).await?;

    Ok(SessionView::of(&record, &interview, decision))
}

/// Explicit end signal from the candidate.
pub async fn end_session(
    state: &AppState,
    interview_id: Uuid,
    user_id: &str,
) -> Result<SessionView, AppError> {
    let interview = load_interview(state, interview_id).await?;
    let _guard = state.locks.acquire(interview_id).await;
    let mut record = load_session(state, interview_id, user_id).await?;

    if !record.status.is_terminal() {
        record.status = SessionStatus::Ended;
        record.updated_at = Utc::now();
        state.store.save_session(&record).await?;
        info!("Session for interview {interview_id}, user {user_id} ended on request");
    }

    Ok(SessionView::of(&record, &interview, Decision::End))
}
