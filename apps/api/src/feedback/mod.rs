// Feedback scoring: transcript in, validated score out, persisted per (interview, user).
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod handlers;
pub mod prompts;
pub mod schema;
pub mod scoring;
