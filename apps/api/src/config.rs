use std::time::Duration;

use anyhow::{Context, Result};

/// Ranked candidates for social post generation when `CANDIDATE_MODELS` is unset.
const DEFAULT_CANDIDATE_MODELS: &str = "gemini-2.5-flash,gemini-1.5-flash,gemini-2.0-flash-exp";
const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Resolved once at startup and injected into every collaborator.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    /// Ordered list consumed by ranked fallback. Operators reorder it without code changes.
    pub candidate_models: Vec<String>,
    /// Single model used by retry-with-backoff analysis tasks.
    pub analysis_model: String,
    pub llm_timeout: Duration,
    pub rate_limit_backoff: Duration,
    pub linkedin_client_id: String,
    pub linkedin_client_secret: String,
    pub redirect_uri: String,
    pub frontend_url: String,
    /// Missing key switches job search to a mock listing.
    pub rapidapi_key: Option<String>,
    /// Missing endpoint makes every scrape request fail with 400.
    pub scraper_endpoint: Option<String>,
    /// A live scrape drives a headless browser and routinely takes longer than a model call.
    pub scraper_timeout: Duration,
    /// Body limit for the PDF upload routes.
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which returns the raw value of a variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Env(&lookup);

        Ok(Config {
            database_url: env.require("DATABASE_URL")?,
            gemini_api_key: env.require("GEMINI_API_KEY")?,
            candidate_models: parse_model_list(
                &env.get("CANDIDATE_MODELS")
                    .unwrap_or_else(|| DEFAULT_CANDIDATE_MODELS.to_string()),
            )?,
            analysis_model: env
                .get("ANALYSIS_MODEL")
                .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string()),
            llm_timeout: Duration::from_secs(env.number_or("LLM_TIMEOUT_SECS", 30)?),
            rate_limit_backoff: Duration::from_secs(env.number_or("RATE_LIMIT_BACKOFF_SECS", 5)?),
            linkedin_client_id: env.require("LINKEDIN_CLIENT_ID")?,
            linkedin_client_secret: env.require("LINKEDIN_CLIENT_SECRET")?,
            redirect_uri: env.require("REDIRECT_URI")?,
            frontend_url: env
                .require("FRONTEND_URL")?
                .trim_end_matches('/')
                .to_string(),
            rapidapi_key: env.optional("RAPIDAPI_KEY"),
            scraper_endpoint: env.optional("SCRAPER_ENDPOINT"),
            scraper_timeout: Duration::from_secs(env.number_or("SCRAPER_TIMEOUT_SECS", 90)?),
            max_upload_bytes: usize::try_from(
                env.number_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            )
            .context("MAX_UPLOAD_BYTES does not fit in memory on this platform")?,
            port: env
                .get("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env.get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    fn number_or(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a non-negative whole number")),
            None => Ok(default),
        }
    }
}

/// Splits a comma-separated model list, preserving order and dropping blanks.
pub fn parse_model_list(raw: &str) -> Result<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect();

    anyhow::ensure!(!models.is_empty(), "CANDIDATE_MODELS must name at least one model");
    Ok(models)
}
