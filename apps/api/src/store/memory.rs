use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::feedback::Feedback;
use crate::models::interview::Interview;
use crate::models::session::SessionRecord;
use crate::store::InterviewStore;

type PairKey = (Uuid, String);

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    interviews: RwLock<HashMap<Uuid, Interview>>,
    sessions: RwLock<HashMap<PairKey, SessionRecord>>,
    feedback: RwLock<HashMap<PairKey, Feedback>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn feedback_count(&self) -> usize {
        self.feedback.read().await.len()
    }
}

fn newest_first(mut interviews: Vec<Interview>) -> Vec<Interview> {
    interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    interviews
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn insert_interview(&self, interview: &Interview) -> Result<(), AppError> {
        self.interviews
            .write()
            .await
            .insert(interview.id, interview.clone());
        Ok(())
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>, AppError> {
        Ok(self.interviews.read().await.get(&id).cloned())
    }

    async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>, AppError> {
        let owned = self
            .interviews
            .read()
            .await
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(owned))
    }

    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<Interview>, AppError> {
        let others = self
            .interviews
            .read()
            .await
            .values()
            .filter(|i| i.user_id != exclude_user_id)
            .cloned()
            .collect();
        Ok(newest_first(others).into_iter().take(limit).collect())
    }

    async fn get_session(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<SessionRecord>, AppError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&(interview_id, user_id.to_string()))
            .cloned())
    }

    async fn save_session(&self, session: &SessionRecord) -> Result<(), AppError> {
        self.sessions.write().await.insert(
            (session.interview_id, session.user_id.clone()),
            session.clone(),
        );
        Ok(())
    }

    async fn record_score(
        &self,
        feedback: &Feedback,
        session: &SessionRecord,
    ) -> Result<(), AppError> {
        // both guards held, so readers never see one write without the other
        let mut sessions = self.sessions.write().await;
        let mut scores = self.feedback.write().await;
        sessions.insert(
            (session.interview_id, session.user_id.clone()),
            session.clone(),
        );
        scores.insert(
            (feedback.interview_id, feedback.user_id.clone()),
            feedback.clone(),
        );
        Ok(())
    }

    async fn get_feedback(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, AppError> {
        Ok(self
            .feedback
            .read()
            .await
            .get(&(interview_id, user_id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::interview::{InterviewSpec, InterviewType, Level};
    use crate::models::session::SessionStatus;

    fn interview(user_id: &str, minutes_ago: i64) -> Interview {
        let mut interview = Interview::new(
            InterviewSpec {
                role: "Backend Engineer".to_string(),
                level: Level::Junior,
                interview_type: InterviewType::Mixed,
                amount: 1,
                techstack: vec!["Rust".to_string()],
            },
            user_id.to_string(),
            vec!["Why Rust?".to_string()],
        );
        interview.created_at = Utc::now() - Duration::minutes(minutes_ago);
        interview
    }

    fn feedback(interview_id: Uuid, total: u8) -> Feedback {
        Feedback {
            interview_id,
            user_id: "user-1".to_string(),
            total_score: total,
            category_scores: BTreeMap::new(),
            strengths: vec![],
            areas_for_improvement: vec![],
            final_assessment: format!("scored {total}"),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_feedback_upsert_replaces_existing_pair() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        let mut session = SessionRecord::new(id, "user-1".to_string());
        session.status = SessionStatus::Scored;
        store.record_score(&feedback(id, 40), &session).await.unwrap();
        store.record_score(&feedback(id, 75), &session).await.unwrap();

        assert_eq!(store.feedback_count().await, 1);
        let stored = store.get_feedback(id, "user-1").await.unwrap().unwrap();
        assert_eq!(stored.total_score, 75);
        assert_eq!(stored.final_assessment, "scored 75");
        let session = store.get_session(id, "user-1").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Scored);
    }

    #[tokio::test]
    async fn test_interviews_by_user_newest_first() {
        let store = MemoryStore::new();
        let older = interview("user-1", 30);
        let newer = interview("user-1", 5);
        store.insert_interview(&older).await.unwrap();
        store.insert_interview(&newer).await.unwrap();
        store.insert_interview(&interview("user-2", 1)).await.unwrap();

        let listed = store.interviews_by_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
    }

    #[tokio::test]
    async fn test_latest_interviews_excludes_user_and_limits() {
        let store = MemoryStore::new();
        store.insert_interview(&interview("user-1", 1)).await.unwrap();
        for minutes in [10, 20, 30] {
            store.insert_interview(&interview("user-2", minutes)).await.unwrap();
        }

        let latest = store.latest_interviews("user-1", 2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|i| i.user_id == "user-2"));
        assert!(latest[0].created_at > latest[1].created_at);
    }

    #[tokio::test]
    async fn test_sessions_are_keyed_by_pair() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .save_session(&SessionRecord::new(id, "user-1".to_string()))
            .await
            .unwrap();

        assert!(store.get_session(id, "user-1").await.unwrap().is_some());
        assert!(store.get_session(id, "user-2").await.unwrap().is_none());
    }
}
