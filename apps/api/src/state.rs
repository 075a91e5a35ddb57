use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmBackend;
use crate::session::engine::TurnPolicy;
use crate::session::follow_up::FollowUpAdvisor;
use crate::session::locks::SessionLocks;
use crate::store::InterviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory when `DATABASE_URL` is unset.
    pub store: Arc<dyn InterviewStore>,
    pub llm: Arc<dyn LlmBackend>,
    /// Base-only by default. Swap via ENABLE_FOLLOW_UPS env.
    pub turn_policy: Arc<TurnPolicy>,
    pub locks: SessionLocks,
}

impl AppState {
    pub fn new(store: Arc<dyn InterviewStore>, llm: Arc<dyn LlmBackend>, config: &Config) -> Self {
        let turn_policy = if config.enable_follow_ups {
            TurnPolicy::WithFollowUps(FollowUpAdvisor::new(
                llm.clone(),
                config.max_follow_ups_per_question,
            ))
        } else {
            TurnPolicy::BaseOnly
        };

        Self {
            store,
            llm,
            turn_policy: Arc::new(turn_policy),
            locks: SessionLocks::new(),
        }
    }

    #[cfg(test)]
    pub fn for_tests(
        store: Arc<dyn InterviewStore>,
        llm: Arc<dyn LlmBackend>,
        follow_ups: bool,
    ) -> Self {
        let turn_policy = if follow_ups {
            TurnPolicy::WithFollowUps(FollowUpAdvisor::new(llm.clone(), 1))
        } else {
            TurnPolicy::BaseOnly
        };

        Self {
            store,
            llm,
            turn_policy: Arc::new(turn_policy),
            locks: SessionLocks::new(),
        }
    }
}
