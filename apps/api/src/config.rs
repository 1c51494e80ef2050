use std::time::Duration;

use anyhow::{Context, Result};

use crate::chat::composer::DEFAULT_GENERATION_TIMEOUT;
use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Every collaborator is optional; which ones are set decides the operating mode.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: Option<GeminiConfig>,
    pub elastic: Option<ElasticConfig>,
    pub generation_timeout: Duration,
    pub fallback_seed: Option<u64>,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct ElasticConfig {
    pub url: String,
    pub index: String,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini = get("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        });

        let elastic = get("ELASTIC_URL").map(|url| ElasticConfig {
            url,
            index: get("ELASTIC_INDEX").unwrap_or_else(|| "jobs".to_string()),
            api_key: get("ELASTIC_API_KEY"),
        });

        let generation_timeout = match get("GENERATION_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => DEFAULT_GENERATION_TIMEOUT,
        };

        let fallback_seed = get("FALLBACK_SEED")
            .map(|seed| seed.parse::<u64>())
            .transpose()
            .context("FALLBACK_SEED must be an unsigned integer")?;

        Ok(Config {
            gemini,
            elastic,
            generation_timeout,
            fallback_seed,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
