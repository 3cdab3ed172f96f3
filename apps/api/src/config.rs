use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Startup fails if either secret is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub webhook_url: reqwest::Url,
    pub gemini_api_base: String,
    pub llm_timeout: Duration,
    pub webhook_timeout: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_raw = require(&lookup, "N8N_WEBHOOK_URL")?;
        let webhook_url = reqwest::Url::parse(&webhook_raw)
            .with_context(|| "N8N_WEBHOOK_URL must be an absolute URL".to_string())?;
        if !matches!(webhook_url.scheme(), "http" | "https") {
            bail!("N8N_WEBHOOK_URL must use http or https");
        }

        Ok(Config {
            gemini_api_key: require(&lookup, "GEMINI_API_KEY")?,
            webhook_url,
            gemini_api_base: lookup("GEMINI_API_BASE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?),
            webhook_timeout: Duration::from_secs(parse_or(&lookup, "WEBHOOK_TIMEOUT_SECS", 30)?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => bail!("Required environment variable '{key}' is not set"),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
