use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const DEFAULT_SUBMIT_COOLDOWN_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub question_count: u32,
    pub submit_cooldown: Duration,
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\stunotes")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/stunotes")
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number, got {:?}", key, raw))),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    /// for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("STUNOTES_BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let timeout_secs = parse_var(
            "STUNOTES_REQUEST_TIMEOUT_SECS",
            lookup("STUNOTES_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let question_count = parse_var(
            "STUNOTES_QUESTION_COUNT",
            lookup("STUNOTES_QUESTION_COUNT"),
            DEFAULT_QUESTION_COUNT,
        )?;
        let cooldown_ms = parse_var(
            "STUNOTES_SUBMIT_COOLDOWN_MS",
            lookup("STUNOTES_SUBMIT_COOLDOWN_MS"),
            DEFAULT_SUBMIT_COOLDOWN_MS,
        )?;

        if question_count == 0 {
            return Err(AppError::Config(
                "STUNOTES_QUESTION_COUNT must be at least 1".to_string(),
            ));
        }

        let data_dir = lookup("STUNOTES_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            backend_url,
            request_timeout: Duration::from_secs(timeout_secs),
            question_count,
            submit_cooldown: Duration::from_millis(cooldown_ms),
            data_dir,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("stunotes.log")
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.question_count, 10);
        assert_eq!(config.submit_cooldown, Duration::from_millis(1000));
        assert!(config.data_dir.ends_with("stunotes"));
    }

    #[test]
    fn test_backend_url_trailing_slash_trimmed() {
        let config =
            Config::from_lookup(lookup_from(&[("STUNOTES_BACKEND_URL", "https://api.example.com/")]))
                .unwrap();
        assert_eq!(config.backend_url, "https://api.example.com");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = Config::from_lookup(lookup_from(&[("STUNOTES_REQUEST_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_question_count_rejected() {
        let result = Config::from_lookup(lookup_from(&[("STUNOTES_QUESTION_COUNT", "0")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_paths_live_in_data_dir() {
        let config =
            Config::from_lookup(lookup_from(&[("STUNOTES_DATA_DIR", "/tmp/stunotes-test")])).unwrap();
        assert_eq!(config.log_path(), PathBuf::from("/tmp/stunotes-test/stunotes.log"));
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/stunotes-test/storage.json"));
    }
}
