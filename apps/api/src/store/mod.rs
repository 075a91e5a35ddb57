//! Persistence of interviews, sessions and feedback.
//!
//! Keyed by interview id and user id. `AppState` holds an `Arc<dyn InterviewStore>`:
//! `PgStore` when `DATABASE_URL` is set, `MemoryStore` otherwise.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feedback::Feedback;
use crate::models::interview::Interview;
use crate::models::session::SessionRecord;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn insert_interview(&self, interview: &Interview) -> Result<(), AppError>;

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>, AppError>;

    /// The user's own interviews, newest first.
    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>, AppError>;

    /// Other users' interviews, newest first.
    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<Interview>, AppError>;

    async fn get_session(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<SessionRecord>, AppError>;

    /// Inserts or replaces the session for its (interview, user) pair.
    async fn save_session(&self, session: &SessionRecord) -> Result<(), AppError>;

    /// Inserts or replaces the feedback and the scored session for their
    /// (interview, user) pair. Both are written or neither is.
    async fn record_score(
        &self,
        feedback: &Feedback,
        session: &SessionRecord,
    ) -> Result<(), AppError>;

    async fn get_feedback(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, AppError>;
}
