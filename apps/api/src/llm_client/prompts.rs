// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it and reuses these.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Output is read aloud by a voice assistant, so punctuation must stay plain.
pub const VOICE_SAFE_INSTRUCTION: &str = "\
    The questions will be read by a voice assistant. \
    Do NOT use \"/\", \"*\" or any other special characters that would break speech synthesis.";

/// Builds a system prompt from a persona line followed by the JSON-only rules.
pub fn json_system(persona: &str) -> String {
    format!("{persona} {JSON_ONLY_SYSTEM}")
}
