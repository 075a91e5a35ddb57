//! Axum route handlers for interview creation and reads.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::interview::question_bank::create_interview;
use crate::models::interview::{Interview, InterviewSpec, InterviewType, Level, MAX_QUESTION_AMOUNT};
use crate::session::service::load_interview;
use crate::state::AppState;

const DEFAULT_LATEST_LIMIT: usize = 20;
const MAX_LATEST_LIMIT: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub role: String,
    #[serde(default)]
    pub level: Level,
    #[serde(rename = "type", default)]
    pub interview_type: InterviewType,
    /// Signed so out-of-range values reach validation instead of failing to parse.
    pub amount: i64,
    pub techstack: serde_json::Value,
    #[serde(alias = "userid", alias = "user_id")]
    pub user_id: String,
}

impl GenerateRequest {
    fn into_spec(self) -> Result<(InterviewSpec, String), AppError> {
        let amount = u32::try_from(self.amount).map_err(|_| {
            AppError::Validation(format!("amount must be between 1 and {MAX_QUESTION_AMOUNT}"))
        })?;
        let spec: InterviewSpec = serde_json::from_value(serde_json::json!({
            "role": self.role,
            "level": self.level,
            "type": self.interview_type,
            "amount": amount,
            "techstack": self.techstack,
        }))
        .map_err(|e| AppError::Validation(format!("Invalid techstack: {e}")))?;
        Ok((spec, self.user_id))
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct InterviewResponse {
    pub success: bool,
    pub interview: Interview,
}

#[derive(Debug, Serialize)]
pub struct InterviewListResponse {
    pub success: bool,
    pub interviews: Vec<Interview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(alias = "userid", alias = "user_id")]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestQuery {
    #[serde(alias = "userid", alias = "user_id")]
    pub user_id: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LatestQuery {
    fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LATEST_LIMIT)
            .min(MAX_LATEST_LIMIT)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /interview-generate
///
/// Generates the question bank and persists the interview in one step.
pub async fn handle_generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let (spec, user_id) = request.into_spec()?;
    let interview = create_interview(state.store.as_ref(), state.llm.as_ref(), spec, user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            success: true,
            id: interview.id,
        }),
    ))
}

/// GET /interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    ApiPath(interview_id): ApiPath<Uuid>,
) -> Result<Json<InterviewResponse>, AppError> {
    let interview = load_interview(&state, interview_id).await?;
    Ok(Json(InterviewResponse {
        success: true,
        interview,
    }))
}

/// GET /interviews?userId=
///
/// The caller's own interviews, newest first.
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<InterviewListResponse>, AppError> {
    let interviews = state.store.interviews_by_user(&query.user_id).await?;
    Ok(Json(InterviewListResponse {
        success: true,
        interviews,
    }))
}

/// GET /interviews/latest?userId=&limit=
///
/// Other users' interviews, for browsing. Never includes the caller's own.
pub async fn handle_latest_interviews(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LatestQuery>,
) -> Result<Json<InterviewListResponse>, AppError> {
    let limit = query.effective_limit();
    let interviews = state
        .store
        .latest_interviews(&query.user_id, limit)
        .await?;
    info!("latest interviews for {}: {} (limit {limit})", query.user_id, interviews.len());
    Ok(Json(InterviewListResponse {
        success: true,
        interviews,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> GenerateRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_request_accepts_lowercase_userid_and_csv_techstack() {
        let (spec, user_id) = request(json!({
            "role": "Frontend Developer",
            "type": "technical",
            "amount": 10,
            "techstack": "React, TypeScript",
            "userid": "user-1"
        }))
        .into_spec()
        .unwrap();

        assert_eq!(user_id, "user-1");
        assert_eq!(spec.techstack, vec!["React", "TypeScript"]);
        assert_eq!(spec.level, Level::Junior);
        assert_eq!(spec.interview_type, InterviewType::Technical);
    }

    #[test]
    fn test_negative_amount_is_invalid_input() {
        let result = request(json!({
            "role": "Backend",
            "amount": -3,
            "techstack": ["Rust"],
            "userId": "user-1"
        }))
        .into_spec();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_latest_limit_defaults_and_caps() {
        let default = LatestQuery {
            user_id: "u".to_string(),
            limit: None,
        };
        let huge = LatestQuery {
            user_id: "u".to_string(),
            limit: Some(5000),
        };
        assert_eq!(default.effective_limit(), 20);
        assert_eq!(huge.effective_limit(), 100);
    }
}
