use std::{env, time::Duration};
use secrecy::SecretString;

use crate::constants::quiz_limits::DEFAULT_EXCLUSION_CONTEXT_LIMIT;

pub const DEFAULT_AI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_AI_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub ai_api_base: String,
    pub ai_model: String,
    /// Process-wide fallback used when a session brings no key of its own.
    pub ai_api_key: Option<SecretString>,
    pub quiz_language: String,
    pub exclusion_context_limit: usize,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped by the sweeper.
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            ai_api_base: env::var("AI_API_BASE").unwrap_or_else(|_| DEFAULT_AI_API_BASE.to_string()),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            ai_api_key: env::var("AI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from),
            quiz_language: env::var("QUIZ_LANGUAGE").unwrap_or_else(|_| "English".to_string()),
            exclusion_context_limit: env::var("EXCLUSION_CONTEXT_LIMIT")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(DEFAULT_EXCLUSION_CONTEXT_LIMIT),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(20 * 1024 * 1024),
            session_idle_ttl: Duration::from_secs(
                env::var("SESSION_IDLE_TTL_SECS")
                    .ok()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(DEFAULT_SESSION_IDLE_TTL_SECS),
            ),
            session_sweep_interval: Duration::from_secs(
                env::var("SESSION_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|n| n.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            ),
            max_sessions: env::var("MAX_SESSIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|max| *max > 0)
                .unwrap_or(DEFAULT_MAX_SESSIONS),
        }
    }

    /// Logs the settings that will make every upload fail unless users bring a key.
    pub fn warn_on_missing_credentials(&self) {
        if self.ai_api_key.is_none() {
            log::warn!(
                "AI_API_KEY is not set; uploads without an X-Api-Key header will fail with a credential error"
            );
        }
        if !self.ai_api_base.starts_with("http://") && !self.ai_api_base.starts_with("https://") {
            log::warn!("AI_API_BASE '{}' does not look like an HTTP URL", self.ai_api_base);
        }
    }

    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            ai_api_base: "http://localhost:9999/v1".to_string(),
            ai_model: "test-model".to_string(),
            ai_api_key: Some(SecretString::from("test_api_key".to_string())),
            quiz_language: "English".to_string(),
            exclusion_context_limit: DEFAULT_EXCLUSION_CONTEXT_LIMIT,
            max_upload_bytes: 1024 * 1024,
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            session_sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            max_sessions: 100,
        }
    }
}
