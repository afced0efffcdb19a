use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::ollama;
use crate::tailoring::{TailoringConfig, DEFAULT_CHARS_PER_PAGE};

/// Which model backend answers relevance prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleBackend {
    Ollama,
    Anthropic,
}

impl FromStr for OracleBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            other => bail!("Unknown ORACLE_BACKEND '{other}' (expected 'ollama' or 'anthropic')"),
        }
    }
}

/// S3 / MinIO settings. Present only when all four variables are set.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub oracle_backend: OracleBackend,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub anthropic_api_key: Option<String>,
    pub chars_per_page: usize,
    pub scoring_concurrency: usize,
    pub default_page_limit: u32,
    pub update_interval_secs: u64,
    pub enforce_job_urls: bool,
    pub latex_command: String,
    pub compile_timeout_secs: u64,
    pub s3: Option<S3Config>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let oracle_backend: OracleBackend = parse_or(
            "ORACLE_BACKEND",
            optional_env("ORACLE_BACKEND"),
            OracleBackend::Ollama,
        )?;
        let anthropic_api_key = optional_env("ANTHROPIC_API_KEY");
        if oracle_backend == OracleBackend::Anthropic && anthropic_api_key.is_none() {
            bail!("ANTHROPIC_API_KEY is required when ORACLE_BACKEND=anthropic");
        }

        let chars_per_page: usize =
            parse_or("CHARS_PER_PAGE", optional_env("CHARS_PER_PAGE"), DEFAULT_CHARS_PER_PAGE)?;
        if chars_per_page == 0 {
            bail!("CHARS_PER_PAGE must be greater than zero");
        }

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            oracle_backend,
            ollama_base_url: optional_env("OLLAMA_BASE_URL")
                .unwrap_or_else(|| ollama::DEFAULT_BASE_URL.to_string()),
            ollama_model: optional_env("OLLAMA_MODEL")
                .unwrap_or_else(|| ollama::DEFAULT_MODEL.to_string()),
            anthropic_api_key,
            chars_per_page,
            scoring_concurrency: parse_or(
                "SCORING_CONCURRENCY",
                optional_env("SCORING_CONCURRENCY"),
                4,
            )?,
            default_page_limit: parse_or(
                "DEFAULT_PAGE_LIMIT",
                optional_env("DEFAULT_PAGE_LIMIT"),
                1,
            )?,
            update_interval_secs: parse_or(
                "UPDATE_INTERVAL_SECS",
                optional_env("UPDATE_INTERVAL_SECS"),
                24 * 60 * 60,
            )?,
            enforce_job_urls: parse_or(
                "ENFORCE_JOB_URLS",
                optional_env("ENFORCE_JOB_URLS"),
                true,
            )?,
            latex_command: optional_env("LATEX_COMMAND").unwrap_or_else(|| "pdflatex".to_string()),
            compile_timeout_secs: parse_or(
                "COMPILE_TIMEOUT_SECS",
                optional_env("COMPILE_TIMEOUT_SECS"),
                60,
            )?,
            s3: s3_from_env(),
            port: parse_or("PORT", optional_env("PORT"), 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn tailoring(&self) -> TailoringConfig {
        TailoringConfig {
            chars_per_page: self.chars_per_page,
            scoring_concurrency: self.scoring_concurrency.max(1),
            default_page_limit: self.default_page_limit,
            update_interval: Duration::from_secs(self.update_interval_secs),
            enforce_job_urls: self.enforce_job_urls,
        }
    }
}

fn s3_from_env() -> Option<S3Config> {
    Some(S3Config {
        bucket: optional_env("S3_BUCKET")?,
        endpoint: optional_env("S3_ENDPOINT")?,
        access_key_id: optional_env("AWS_ACCESS_KEY_ID")?,
        secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY")?,
    })
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are the same thing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("ollama".parse::<OracleBackend>().unwrap(), OracleBackend::Ollama);
        assert_eq!(" Anthropic ".parse::<OracleBackend>().unwrap(), OracleBackend::Anthropic);
        assert!("gpt".parse::<OracleBackend>().is_err());
    }

    #[test]
    fn test_parse_or_default_and_override() {
        assert_eq!(parse_or::<usize>("X", None, 8000).unwrap(), 8000);
        assert_eq!(parse_or::<usize>("X", Some("3500".to_string()), 8000).unwrap(), 3500);
        assert!(!parse_or::<bool>("X", Some("false".to_string()), true).unwrap());
    }

    #[test]
    fn test_parse_or_names_the_variable() {
        let err = parse_or::<u16>("PORT", Some("eighty".to_string()), 8080).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_tailoring_view() {
        let config = Config {
            redis_url: "redis://localhost".to_string(),
            oracle_backend: OracleBackend::Ollama,
            ollama_base_url: ollama::DEFAULT_BASE_URL.to_string(),
            ollama_model: ollama::DEFAULT_MODEL.to_string(),
            anthropic_api_key: None,
            chars_per_page: 3500,
            scoring_concurrency: 0,
            default_page_limit: 2,
            update_interval_secs: 60,
            enforce_job_urls: false,
            latex_command: "pdflatex".to_string(),
            compile_timeout_secs: 60,
            s3: None,
            port: 8080,
            rust_log: "info".to_string(),
        };
        let tailoring = config.tailoring();
        assert_eq!(tailoring.chars_per_page, 3500);
        assert_eq!(tailoring.scoring_concurrency, 1);
        assert_eq!(tailoring.default_page_limit, 2);
        assert_eq!(tailoring.update_interval, Duration::from_secs(60));
        assert!(!tailoring.enforce_job_urls);
    }
}
