// Interview Session Orchestration: budget tracking, turn decisions, live sessions.
// Backend calls go through llm_client only, and only when follow-ups are enabled.

pub mod budget;
pub mod engine;
pub mod follow_up;
pub mod handlers;
pub mod locks;
pub mod prompts;
pub mod service;
pub mod state;
