use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Application configuration loaded from environment variables.
/// Every key has a default; the model provider is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_request_timeout: Duration,
    pub data_dir: PathBuf,
    /// Overrides the built-in section-generation system prompt.
    pub system_prompt_path: Option<PathBuf>,
    pub pdflatex_bin: String,
    pub compile_timeout: Duration,
    pub job_timeout: Duration,
    pub max_job_age: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            llm_model: non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_max_tokens: parse_or(&non_empty, "LLM_MAX_TOKENS", 8192)?,
            llm_request_timeout: Duration::from_secs(parse_or(
                &non_empty,
                "LLM_REQUEST_TIMEOUT_SECS",
                180,
            )?),
            data_dir: non_empty("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            system_prompt_path: non_empty("SYSTEM_PROMPT_PATH").map(PathBuf::from),
            pdflatex_bin: non_empty("PDFLATEX_BIN").unwrap_or_else(|| "pdflatex".to_string()),
            compile_timeout: Duration::from_secs(parse_or(&non_empty, "COMPILE_TIMEOUT_SECS", 30)?),
            job_timeout: Duration::from_secs(parse_or(&non_empty, "JOB_TIMEOUT_SECS", 300)?),
            max_job_age: Duration::from_secs(parse_or(&non_empty, "MAX_JOB_AGE_SECS", 3600)?),
            port: parse_or(&non_empty, "PORT", 8080)?,
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn originals_dir(&self) -> PathBuf {
        self.data_dir.join("original")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.data_dir.join("tailored_resumes")
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
