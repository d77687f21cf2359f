use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::query_cache::QueryOptions;

pub const DEFAULT_SEASONS_API_BASE: &str = "https://www.thesportsdb.com/api/v1/json/3";
const DEFAULT_LOG_FILE: &str = "leagues_terminal.log";

fn get_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_env_u64(key: &str, default: u64) -> Result<u64> {
    match get_env(key) {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map_err(|e| anyhow!("{key} invalid int: {e}")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Api,
    Demo,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceKind,
    pub leagues_api_url: Option<String>,
    pub seasons_api_base: String,
    pub request_timeout: Duration,
    pub leagues_cache: QueryOptions,
    pub seasons_cache: QueryOptions,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceKind::Api,
            leagues_api_url: None,
            seasons_api_base: DEFAULT_SEASONS_API_BASE.to_string(),
            request_timeout: Duration::from_secs(10),
            leagues_cache: QueryOptions::minutes(10, 30),
            seasons_cache: QueryOptions::minutes(15, 30),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment. Call after the dotenv files
    /// have been loaded.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let leagues_api_url = get_env("LEAGUES_API_URL").or_else(|| get_env("VITE_API_URL"));
        let source = match get_env("LEAGUES_SOURCE").map(|s| s.to_lowercase()) {
            None => SourceKind::Api,
            Some(s) if s == "api" => SourceKind::Api,
            Some(s) if s == "demo" => SourceKind::Demo,
            Some(other) => return Err(anyhow!("LEAGUES_SOURCE must be api or demo, got {other}")),
        };

        let timeout_secs = get_env_u64("REQUEST_TIMEOUT_SECS", 10)?.max(1);
        let gc_mins = get_env_u64("CACHE_GC_MINS", 30)?;
        let leagues_stale = get_env_u64("LEAGUES_STALE_MINS", 10)?;
        let seasons_stale = get_env_u64("SEASONS_STALE_MINS", 15)?;

        Ok(Self {
            source,
            leagues_api_url,
            seasons_api_base: get_env("SEASONS_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.seasons_api_base),
            request_timeout: Duration::from_secs(timeout_secs),
            leagues_cache: QueryOptions::minutes(leagues_stale, gc_mins),
            seasons_cache: QueryOptions::minutes(seasons_stale, gc_mins),
            log_file: get_env("LEAGUES_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        })
    }

    /// The leagues URL, required unless the demo source is selected.
    pub fn require_leagues_url(&self) -> Result<&str> {
        self.leagues_api_url
            .as_deref()
            .ok_or_else(|| anyhow!("LEAGUES_API_URL is not set (or pass --api-url / --demo)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cache_windows() {
        let settings = Settings::default();
        assert_eq!(settings.source, SourceKind::Api);
        assert_eq!(settings.leagues_cache, QueryOptions::minutes(10, 30));
        assert_eq!(settings.seasons_cache, QueryOptions::minutes(15, 30));
        assert_eq!(settings.seasons_api_base, DEFAULT_SEASONS_API_BASE);
    }

    #[test]
    fn api_source_needs_a_leagues_url() {
        let mut settings = Settings::default();
        assert!(settings.require_leagues_url().is_err());
        settings.leagues_api_url = Some("https://example.test/all_leagues.php".to_string());
        assert_eq!(
            settings.require_leagues_url().ok(),
            Some("https://example.test/all_leagues.php")
        );
    }
}
