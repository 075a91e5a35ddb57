use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feedback::Feedback;
use crate::models::interview::{BaseQuestion, Interview};
use crate::models::session::SessionRecord;
use crate::models::transcript::ConversationTurn;
use crate::store::InterviewStore;

/// PostgreSQL-backed store. Schema lives in `migrations/0001_init.sql`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates the connection pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

#[derive(Debug, FromRow)]
struct InterviewRow {
    id: Uuid,
    user_id: String,
    role: String,
    level: String,
    interview_type: String,
    techstack: Vec<String>,
    amount: i32,
    questions: Json<Vec<BaseQuestion>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for Interview {
    type Error = AppError;

    fn try_from(row: InterviewRow) -> Result<Self, Self::Error> {
        Ok(Interview {
            id: row.id,
            user_id: row.user_id,
            role: row.role,
            level: row.level.parse().map_err(|e: String| anyhow!(e))?,
            interview_type: row.interview_type.parse().map_err(|e: String| anyhow!(e))?,
            techstack: row.techstack,
            amount: u32::try_from(row.amount)
                .map_err(|_| anyhow!("interview {} has negative amount", row.id))?,
            questions: row.questions.0,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    interview_id: Uuid,
    user_id: String,
    status: String,
    transcript: Json<Vec<ConversationTurn>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(SessionRecord {
            interview_id: row.interview_id,
            user_id: row.user_id,
            status: row.status.parse().map_err(|e: String| anyhow!(e))?,
            transcript: row.transcript.0,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct FeedbackRow {
    interview_id: Uuid,
    user_id: String,
    total_score: i16,
    category_scores: Json<BTreeMap<String, u8>>,
    strengths: Vec<String>,
    areas_for_improvement: Vec<String>,
    final_assessment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = AppError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        Ok(Feedback {
            interview_id: row.interview_id,
            user_id: row.user_id,
            total_score: u8::try_from(row.total_score)
                .map_err(|_| anyhow!("stored total_score {} out of range", row.total_score))?,
            category_scores: row.category_scores.0,
            strengths: row.strengths,
            areas_for_improvement: row.areas_for_improvement,
            final_assessment: row.final_assessment,
            created_at: row.created_at,
        })
    }
}

fn to_interviews(rows: Vec<InterviewRow>) -> Result<Vec<Interview>, AppError> {
    rows.into_iter().map(Interview::try_from).collect()
}

const SESSION_UPSERT_SQL: &str = r#"
    INSERT INTO interview_sessions (interview_id, user_id, status, transcript, updated_at)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (interview_id, user_id) DO UPDATE
    SET status = EXCLUDED.status,
        transcript = EXCLUDED.transcript,
        updated_at = EXCLUDED.updated_at
"#;

// Rescoring replaces every column, never appends a second row.
const FEEDBACK_UPSERT_SQL: &str = r#"
    INSERT INTO feedback
        (interview_id, user_id, total_score, category_scores, strengths,
         areas_for_improvement, final_assessment, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (interview_id, user_id) DO UPDATE
    SET total_score = EXCLUDED.total_score,
        category_scores = EXCLUDED.category_scores,
        strengths = EXCLUDED.strengths,
        areas_for_improvement = EXCLUDED.areas_for_improvement,
        final_assessment = EXCLUDED.final_assessment,
        created_at = EXCLUDED.created_at
"#;

fn session_upsert(session: &SessionRecord) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(SESSION_UPSERT_SQL)
        .bind(session.interview_id)
        .bind(&session.user_id)
        .bind(session.status.as_str())
        .bind(Json(&session.transcript))
        .bind(session.updated_at)
}

fn feedback_upsert(feedback: &Feedback) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(FEEDBACK_UPSERT_SQL)
        .bind(feedback.interview_id)
        .bind(&feedback.user_id)
        .bind(i16::from(feedback.total_score))
        .bind(Json(&feedback.category_scores))
        .bind(&feedback.strengths)
        .bind(&feedback.areas_for_improvement)
        .bind(&feedback.final_assessment)
        .bind(feedback.created_at)
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn insert_interview(&self, interview: &Interview) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO interviews
                (id, user_id, role, level, interview_type, techstack, amount, questions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(interview.id)
        .bind(&interview.user_id)
        .bind(&interview.role)
        .bind(interview.level.as_str())
        .bind(interview.interview_type.as_str())
        .bind(&interview.techstack)
        .bind(interview.amount as i32)
        .bind(Json(&interview.questions))
        .bind(interview.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>, AppError> {
        sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Interview::try_from)
            .transpose()
    }

    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>, AppError> {
        let rows = sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        to_interviews(rows)
    }

    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<Interview>, AppError> {
        let rows = sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews WHERE user_id <> $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(exclude_user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        to_interviews(rows)
    }

    async fn get_session(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<SessionRecord>, AppError> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM interview_sessions WHERE interview_id = $1 AND user_id = $2",
        )
        .bind(interview_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(SessionRecord::try_from)
        .transpose()
    }

    async fn save_session(&self, session: &SessionRecord) -> Result<(), AppError> {
        session_upsert(session).execute(&self.pool).await?;
        Ok(())
    }

    async fn record_score(
        &self,
        feedback: &Feedback,
        session: &SessionRecord,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        feedback_upsert(feedback).execute(&mut *tx).await?;
        session_upsert(session).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_feedback(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, AppError> {
        sqlx::query_as::<_, FeedbackRow>(
            "SELECT * FROM feedback WHERE interview_id = $1 AND user_id = $2",
        )
        .bind(interview_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Feedback::try_from)
        .transpose()
    }
}
