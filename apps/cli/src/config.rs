//! Environment-driven settings for the CLI.

use std::str::FromStr;
use std::time::Duration;

use faire_sync_connect::{SyncConfig, DEFAULT_FAIRE_API_URL};

pub const DEFAULT_DATABASE_URL: &str = "faire-sync.db";
pub const DEFAULT_STORE_CODE: &str = "toyarina";

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match trimmed(raw) {
        Some(value) => value.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", key, value);
            default
        }),
        None => default,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_url: String,
    /// Store synced when no `--store` is given.
    pub store_code: String,
    pub api_url: String,
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SyncConfig::default();
        let database_url = trimmed(lookup("DATABASE_URL"))
            .map(|url| url.trim_start_matches("sqlite://").to_string())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let page_limit = parse_or(
            "FAIRE_PAGE_LIMIT",
            lookup("FAIRE_PAGE_LIMIT"),
            defaults.page_limit,
        );
        let page_delay_ms = parse_or(
            "FAIRE_PAGE_DELAY_MS",
            lookup("FAIRE_PAGE_DELAY_MS"),
            defaults.page_delay.as_millis() as u64,
        );

        Self {
            database_url,
            store_code: trimmed(lookup("FAIRE_STORE_CODE"))
                .unwrap_or_else(|| DEFAULT_STORE_CODE.to_string()),
            api_url: trimmed(lookup("FAIRE_API_URL"))
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FAIRE_API_URL.to_string()),
            sync: SyncConfig {
                page_limit: page_limit.max(1),
                page_delay: Duration::from_millis(page_delay_ms),
                max_pages: defaults.max_pages,
            },
        }
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        page_limit: Option<u32>,
        page_delay_ms: Option<u64>,
    ) -> Self {
        if let Some(url) = trimmed(database_url) {
            self.database_url = url;
        }
        if let Some(limit) = page_limit {
            self.sync.page_limit = limit.max(1);
        }
        if let Some(delay) = page_delay_ms {
            self.sync.page_delay = Duration::from_millis(delay);
        }
        self
    }

    pub fn store_code_or_default(&self, store: Option<String>) -> String {
        trimmed(store).unwrap_or_else(|| self.store_code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = AppConfig::from_lookup(lookup(&[("FAIRE_STORE_CODE", "  ")]));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.store_code, DEFAULT_STORE_CODE);
        assert_eq!(config.api_url, DEFAULT_FAIRE_API_URL);
        assert_eq!(config.sync, SyncConfig::default());
    }

    #[test]
    fn env_values_are_trimmed_and_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite:///tmp/faire.db"),
            ("FAIRE_STORE_CODE", " shop-2 "),
            ("FAIRE_API_URL", "http://localhost:8080/v2/"),
            ("FAIRE_PAGE_LIMIT", "100"),
            ("FAIRE_PAGE_DELAY_MS", "0"),
        ]));
        assert_eq!(config.database_url, "/tmp/faire.db");
        assert_eq!(config.store_code, "shop-2");
        assert_eq!(config.api_url, "http://localhost:8080/v2");
        assert_eq!(config.sync.page_limit, 100);
        assert_eq!(config.sync.page_delay, Duration::ZERO);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("FAIRE_PAGE_LIMIT", "lots"),
            ("FAIRE_PAGE_DELAY_MS", "-5"),
        ]));
        assert_eq!(config.sync.page_limit, 50);
        assert_eq!(config.sync.page_delay, Duration::from_millis(500));
    }

    #[test]
    fn flags_override_env() {
        let config = AppConfig::from_lookup(lookup(&[("FAIRE_PAGE_LIMIT", "100")]))
            .with_overrides(Some("other.db".to_string()), Some(0), Some(25));
        assert_eq!(config.database_url, "other.db");
        assert_eq!(config.sync.page_limit, 1);
        assert_eq!(config.sync.page_delay, Duration::from_millis(25));
        assert_eq!(config.store_code_or_default(None), DEFAULT_STORE_CODE);
        assert_eq!(
            config.store_code_or_default(Some("other".to_string())),
            "other"
        );
    }
}
