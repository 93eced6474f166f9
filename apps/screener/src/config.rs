use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Without it, settings and history live in process memory only.
    pub redis_url: Option<String>,
    /// Byte quota for the in-memory store; unbounded when unset.
    pub memory_store_capacity: Option<usize>,
    /// Used when no key has been stored through the settings API.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub output_language: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: optional_env("REDIS_URL"),
            memory_store_capacity: optional_env("MEMORY_STORE_CAPACITY")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MEMORY_STORE_CAPACITY must be a byte count")?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output_language: optional_env("OUTPUT_LANGUAGE")
                .unwrap_or_else(|| "English".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
