// Interview creation: question bank generation and interview reads.
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod handlers;
pub mod prompts;
pub mod question_bank;
