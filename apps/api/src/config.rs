use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON role model. Unset disables role prediction entirely.
    pub role_model_path: Option<PathBuf>,
    /// Parent directory for per-request working areas. Defaults to the system temp dir.
    pub work_dir: Option<PathBuf>,
    pub drive_base_url: String,
    pub fetch_timeout: Duration,
    pub fetch_max_retries: u32,
    pub max_download_bytes: u64,
    pub extract_timeout: Duration,
    pub max_archive_depth: usize,
    pub max_archive_bytes: u64,
    pub antiword_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            role_model_path: optional_path("ROLE_MODEL_PATH"),
            work_dir: optional_path("WORK_DIR"),
            drive_base_url: std::env::var("DRIVE_BASE_URL")
                .unwrap_or_else(|_| "https://drive.google.com".to_string()),
            fetch_timeout: Duration::from_secs(parse_env("FETCH_TIMEOUT_SECS", 120)?),
            fetch_max_retries: parse_env("FETCH_MAX_RETRIES", 3)?,
            max_download_bytes: parse_env("MAX_DOWNLOAD_BYTES", 50 * 1024 * 1024)?,
            extract_timeout: Duration::from_secs(parse_env("EXTRACT_TIMEOUT_SECS", 60)?),
            max_archive_depth: parse_env("MAX_ARCHIVE_DEPTH", 5)?,
            max_archive_bytes: parse_env("MAX_ARCHIVE_BYTES", 256 * 1024 * 1024)?,
            antiword_path: optional_path("ANTIWORD_PATH"),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        _ => Ok(default),
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}
