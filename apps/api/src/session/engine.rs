//! Turn Decision Engine.
//!
//! `decide_next` is a pure function of (transcript, next base question, budget).
//! Callers apply the returned `Decision` themselves; see `SessionState::apply`.
//! `TurnPolicy` layers the optional follow-up advisor on top of it.

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::interview::{BaseQuestion, Interview};
use crate::models::transcript::ConversationTurn;
use crate::session::follow_up::FollowUpAdvisor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No further questions; the session becomes terminal.
    End,
    /// Surface the next base question. The caller consumes one unit of budget.
    PresentBase(BaseQuestion),
    /// Surface a synthesized follow-up. Budget is untouched.
    PresentFollowUp(String),
}

impl Decision {
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::End => "end",
            Decision::PresentBase(_) => "base",
            Decision::PresentFollowUp(_) => "followup",
        }
    }
}

/// Decides the next action with follow-ups off.
///
/// Rules, highest priority first:
/// 1. empty transcript → `InvalidInput`
/// 2. budget defined and ≤ 0 → `End`, even when a base question remains
/// 3. base question available → `PresentBase`
/// 4. otherwise → `End`
pub fn decide_next(
    transcript: &[ConversationTurn],
    next_base: Option<&BaseQuestion>,
    remaining_budget: Option<i64>,
) -> Result<Decision, AppError> {
    if transcript.is_empty() {
        return Err(AppError::Validation(
            "Missing conversation messages".to_string(),
        ));
    }

    if budget_exhausted(remaining_budget) {
        return Ok(Decision::End);
    }

    Ok(match next_base {
        Some(question) => Decision::PresentBase(question.clone()),
        None => Decision::End,
    })
}

pub fn budget_exhausted(remaining_budget: Option<i64>) -> bool {
    matches!(remaining_budget, Some(b) if b <= 0)
}

/// The deployed decision policy. Held in `AppState`.
pub enum TurnPolicy {
    BaseOnly,
    WithFollowUps(FollowUpAdvisor),
}

impl TurnPolicy {
    pub async fn decide(
        &self,
        interview: Option<&Interview>,
        transcript: &[ConversationTurn],
        next_base: Option<&BaseQuestion>,
        remaining_budget: Option<i64>,
    ) -> Result<Decision, AppError> {
        let baseline = decide_next(transcript, next_base, remaining_budget)?;

        let advisor = match self {
            TurnPolicy::BaseOnly => return Ok(baseline),
            TurnPolicy::WithFollowUps(advisor) => advisor,
        };

        if !advisor.should_consult(transcript, remaining_budget) {
            debug!("Follow-up advisor skipped; using {}", baseline.kind());
            return Ok(baseline);
        }

        // A failed follow-up must never stall the session.
        match advisor.consult(interview, transcript, next_base).await {
            Ok(decision) => Ok(decision),
            Err(e) => {
                warn!("Follow-up decision failed, ending session: {e}");
                Ok(Decision::End)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::fake::ScriptedBackend;
    use crate::models::transcript::ConversationTurn;

    fn question(ordinal: u32) -> BaseQuestion {
        BaseQuestion {
            text: format!("Question {ordinal}"),
            ordinal,
        }
    }

    fn transcript() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::interviewer("Hello"),
            ConversationTurn::presenting(&question(0)),
            ConversationTurn::candidate("An answer"),
        ]
    }

    #[test]
    fn test_empty_transcript_is_invalid_input() {
        let result = decide_next(&[], Some(&question(0)), Some(3));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_exhausted_budget_ends_even_with_question_available() {
        for budget in [0, -1] {
            let decision = decide_next(&transcript(), Some(&question(3)), Some(budget)).unwrap();
            assert_eq!(decision, Decision::End);
        }
    }

    #[test]
    fn test_presents_available_base_question() {
        let decision = decide_next(&transcript(), Some(&question(1)), Some(2)).unwrap();
        assert_eq!(decision, Decision::PresentBase(question(1)));
    }

    #[test]
    fn test_undefined_budget_presents_base_question() {
        let decision = decide_next(&transcript(), Some(&question(1)), None).unwrap();
        assert_eq!(decision.kind(), "base");
    }

    #[test]
    fn test_no_base_question_ends() {
        assert_eq!(decide_next(&transcript(), None, Some(4)).unwrap(), Decision::End);
        assert_eq!(decide_next(&transcript(), None, None).unwrap(), Decision::End);
    }

    #[test]
    fn test_decision_is_deterministic() {
        let t = transcript();
        let q = question(1);
        let first = decide_next(&t, Some(&q), Some(2)).unwrap();
        for _ in 0..10 {
            assert_eq!(decide_next(&t, Some(&q), Some(2)).unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_base_only_policy_never_calls_backend() {
        let decision = TurnPolicy::BaseOnly
            .decide(None, &transcript(), Some(&question(1)), Some(1))
            .await
            .unwrap();
        assert_eq!(decision, Decision::PresentBase(question(1)));
    }

    #[tokio::test]
    async fn test_follow_up_policy_returns_follow_up() {
        let backend = Arc::new(ScriptedBackend::new().with_text(
            r#"{"action": "followup", "question": "What trade-offs did you weigh?"}"#,
        ));
        let policy = TurnPolicy::WithFollowUps(FollowUpAdvisor::new(backend.clone(), 1));

        let decision = policy
            .decide(None, &transcript(), Some(&question(1)), Some(2))
            .await
            .unwrap();

        assert_eq!(
            decision,
            Decision::PresentFollowUp("What trade-offs did you weigh?".to_string())
        );
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_backend_failure_falls_back_to_end() {
        let backend = Arc::new(ScriptedBackend::new().with_error(503));
        let policy = TurnPolicy::WithFollowUps(FollowUpAdvisor::new(backend.clone(), 1));

        let decision = policy
            .decide(None, &transcript(), Some(&question(1)), Some(2))
            .await
            .unwrap();

        assert_eq!(decision, Decision::End);
    }

    #[tokio::test]
    async fn test_follow_up_policy_respects_exhausted_budget() {
        let backend = Arc::new(ScriptedBackend::new());
        let policy = TurnPolicy::WithFollowUps(FollowUpAdvisor::new(backend.clone(), 1));

        let decision = policy
            .decide(None, &transcript(), Some(&question(1)), Some(0))
            .await
            .unwrap();

        assert_eq!(decision, Decision::End);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_follow_up_policy_still_rejects_empty_transcript() {
        let backend = Arc::new(ScriptedBackend::new());
        let policy = TurnPolicy::WithFollowUps(FollowUpAdvisor::new(backend, 1));
        let result = policy.decide(None, &[], Some(&question(0)), Some(1)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
