//! Axum route handlers for the Feedback API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::feedback::scoring::score_interview;
use crate::models::feedback::Feedback;
use crate::models::transcript::ConversationTurn;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(alias = "userid", alias = "user_id")]
    pub user_id: String,
    #[serde(default)]
    pub transcript: Option<Vec<ConversationTurn>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQuery {
    #[serde(alias = "userid", alias = "user_id")]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub feedback: Feedback,
}

/// POST /interviews/:id/feedback
pub async fn handle_score(
    State(state): State<AppState>,
    ApiPath(interview_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ScoreRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId cannot be empty".to_string()));
    }

    let feedback =
        score_interview(&state, interview_id, &request.user_id, request.transcript).await?;

    Ok(Json(FeedbackResponse {
        success: true,
        feedback,
    }))
}

/// GET /interviews/:id/feedback?userId=
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    ApiPath(interview_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<FeedbackQuery>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let feedback = state
        .store
        .get_feedback(interview_id, &query.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No feedback for interview {interview_id} and user {}",
                query.user_id
            ))
        })?;

    Ok(Json(FeedbackResponse {
        success: true,
        feedback,
    }))
}
