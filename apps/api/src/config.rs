use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory store is used.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub anthropic_api_key: String,
    pub llm_timeout_secs: u64,
    pub enable_follow_ups: bool,
    pub max_follow_ups_per_question: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,
            enable_follow_ups: parse_flag("ENABLE_FOLLOW_UPS")?,
            max_follow_ups_per_question: parse_env("MAX_FOLLOW_UPS_PER_QUESTION", 1)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

fn parse_flag(key: &str) -> Result<bool> {
    match optional_env(key).as_deref().map(str::trim) {
        None => Ok(false),
        Some(v) => parse_bool(v).with_context(|| format!("{key} must be a boolean, got '{v}'")),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
