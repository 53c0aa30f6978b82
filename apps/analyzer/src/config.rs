use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Which key-value backend holds the analysis history blob.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryBackend {
    File(PathBuf),
    Redis(String),
    Memory,
}

/// Application configuration loaded from environment variables.
/// The LLM credential is optional: without it every analysis returns the fallback report.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub history_backend: HistoryBackend,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: optional_env("GROQ_API_KEY"),
            history_backend: history_backend_from_env()?,
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn history_backend_from_env() -> Result<HistoryBackend> {
    let kind = std::env::var("HISTORY_BACKEND").unwrap_or_else(|_| "file".to_string());
    parse_history_backend(
        &kind,
        optional_env("HISTORY_DIR"),
        optional_env("REDIS_URL"),
    )
}

fn parse_history_backend(
    kind: &str,
    dir: Option<String>,
    redis_url: Option<String>,
) -> Result<HistoryBackend> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "file" => Ok(HistoryBackend::File(PathBuf::from(
            dir.unwrap_or_else(|| "./data".to_string()),
        ))),
        "redis" => {
            let url = redis_url.with_context(|| {
                "Required environment variable 'REDIS_URL' is not set (HISTORY_BACKEND=redis)"
            })?;
            Ok(HistoryBackend::Redis(url))
        }
        "memory" => Ok(HistoryBackend::Memory),
        other => bail!("HISTORY_BACKEND must be one of file, redis, memory (got '{other}')"),
    }
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_defaults_to_data_dir() {
        let backend = parse_history_backend("file", None, None).unwrap();
        assert_eq!(backend, HistoryBackend::File(PathBuf::from("./data")));
    }

    #[test]
    fn test_file_backend_uses_configured_dir() {
        let backend = parse_history_backend("FILE", Some("/var/lib/analyzer".into()), None).unwrap();
        assert_eq!(
            backend,
            HistoryBackend::File(PathBuf::from("/var/lib/analyzer"))
        );
    }

    #[test]
    fn test_redis_backend_requires_url() {
        let err = parse_history_backend("redis", None, None).unwrap_err();
        assert!(err.to_string().contains("REDIS_URL"));
    }

    #[test]
    fn test_redis_backend_with_url() {
        let backend =
            parse_history_backend("redis", None, Some("redis://localhost:6379".into())).unwrap();
        assert_eq!(
            backend,
            HistoryBackend::Redis("redis://localhost:6379".to_string())
        );
    }

    #[test]
    fn test_memory_backend() {
        assert_eq!(
            parse_history_backend(" memory ", None, None).unwrap(),
            HistoryBackend::Memory
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(parse_history_backend("postgres", None, None).is_err());
    }
}
