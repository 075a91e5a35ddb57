//! Axum route handlers for turn decisions and server-held sessions.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::interview::BaseQuestion;
use crate::models::session::SessionStatus;
use crate::models::transcript::ConversationTurn;
use crate::session::budget::next_base_ordinal;
use crate::session::engine::Decision;
use crate::session::service::{end_session, start_session, submit_answer, SessionView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// The next base question as clients send it: the full object, or just its text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BaseQuestionInput {
    Question(BaseQuestion),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestionRequest {
    pub messages: Vec<ConversationTurn>,
    #[serde(default)]
    pub base_question: Option<BaseQuestionInput>,
    #[serde(default)]
    pub remaining_count: Option<i64>,
}

impl NextQuestionRequest {
    /// A bare text takes the ordinal after the last one tagged in `messages`.
    /// Blank text counts as no question.
    fn next_base(&self) -> Option<BaseQuestion> {
        match self.base_question.as_ref()? {
            BaseQuestionInput::Question(question) => Some(question.clone()),
            BaseQuestionInput::Text(text) if text.trim().is_empty() => None,
            BaseQuestionInput::Text(text) => Some(BaseQuestion {
                text: text.trim().to_string(),
                ordinal: next_base_ordinal(&self.messages),
            }),
        }
    }

    /// Checks `messages` first so a missing or empty list always reads the same.
    fn from_body(body: Value) -> Result<Self, AppError> {
        let has_messages = body
            .get("messages")
            .and_then(Value::as_array)
            .is_some_and(|m| !m.is_empty());
        if !has_messages {
            return Err(AppError::Validation(
                "Missing conversation messages".to_string(),
            ));
        }
        serde_json::from_value(body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
    }
}

/// Wire form of a `Decision`: `{ "type": "end" | "base" | "followup", ... }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionBody {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
}

impl From<&Decision> for DecisionBody {
    fn from(decision: &Decision) -> Self {
        let (question, ordinal) = match decision {
            Decision::End => (None, None),
            Decision::PresentBase(q) => (Some(q.text.clone()), Some(q.ordinal)),
            Decision::PresentFollowUp(text) => (Some(text.clone()), None),
        };
        Self {
            kind: decision.kind(),
            question,
            ordinal,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub decision: DecisionBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserRequest {
    #[serde(alias = "userid", alias = "user_id")]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    #[serde(alias = "userid", alias = "user_id")]
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub expected_turns: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub status: SessionStatus,
    pub decision: DecisionBody,
    pub remaining_budget: u32,
    pub transcript: Vec<ConversationTurn>,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            success: true,
            status: view.status,
            decision: DecisionBody::from(&view.decision),
            remaining_budget: view.remaining_budget,
            transcript: view.transcript,
        }
    }
}

fn require_user(user_id: &str) -> Result<(), AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("userId cannot be empty".to_string()));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /next-question
///
/// Stateless turn decision over a client-held transcript.
pub async fn handle_next_question(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<NextQuestionResponse>, AppError> {
    let request = NextQuestionRequest::from_body(body)?;
    let next_base = request.next_base();

    let decision = state
        .turn_policy
        .decide(
            None,
            &request.messages,
            next_base.as_ref(),
            request.remaining_count,
        )
        .await?;

    info!(
        "next-question: {} turns, remaining={:?} -> {}",
        request.messages.len(),
        request.remaining_count,
        decision.kind()
    );

    Ok(Json(NextQuestionResponse {
        success: true,
        decision: DecisionBody::from(&decision),
    }))
}

/// POST /interviews/:id/session
pub async fn handle_start_session(
    State(state): State<AppState>,
    ApiPath(interview_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<SessionUserRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    require_user(&request.user_id)?;
    let view = start_session(&state, interview_id, &request.user_id).await?;
    Ok(Json(view.into()))
}

/// POST /interviews/:id/session/turns
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    ApiPath(interview_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    require_user(&request.user_id)?;
    let view = submit_answer(
        &state,
        interview_id,
        &request.user_id,
        &request.text,
        request.expected_turns,
    )
    .await?;
    Ok(Json(view.into()))
}

/// POST /interviews/:id/session/end
pub async fn handle_end_session(
    State(state): State<AppState>,
    ApiPath(interview_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<SessionUserRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    require_user(&request.user_id)?;
    let view = end_session(&state, interview_id, &request.user_id).await?;
    Ok(Json(view.into()))
}
