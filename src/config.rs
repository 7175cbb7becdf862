//! Runtime configuration.
//!
//! Values come from the environment (after `.env` is loaded in `main`);
//! command-line flags override them.

use std::time::Duration;

use thiserror::Error;

use crate::api::auth::DEFAULT_SERVICE_NAME;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} is not a number of seconds")]
    InvalidSeconds { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the file repository service, without trailing slash.
    pub api_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Keychain service the token is stored under.
    pub keyring_service: String,
}

impl Config {
    /// Configuration for the given base URL with default timeouts.
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            keyring_service: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// API URL precedence: `FILEREPO_API_URL` > `VITE_API_URL` > default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("FILEREPO_API_URL")
            .or_else(|| lookup("VITE_API_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let mut config = Config::new(&api_url);

        if let Some(value) = lookup("FILEREPO_TIMEOUT_SECS") {
            config.timeout = parse_seconds("FILEREPO_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("FILEREPO_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = parse_seconds("FILEREPO_CONNECT_TIMEOUT_SECS", &value)?;
        }
        if let Some(service) = lookup("FILEREPO_KEYRING_SERVICE") {
            if !service.is_empty() {
                config.keyring_service = service;
            }
        }

        Ok(config)
    }
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.keyring_service, DEFAULT_SERVICE_NAME);
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config::from_lookup(lookup_from(&[
            ("FILEREPO_API_URL", "https://files.example.com/"),
            ("VITE_API_URL", "http://ignored"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://files.example.com");

        let config =
            Config::from_lookup(lookup_from(&[("VITE_API_URL", "http://vite:9000")])).unwrap();
        assert_eq!(config.api_url, "http://vite:9000");
    }

    #[test]
    fn test_timeouts() {
        let config = Config::from_lookup(lookup_from(&[
            ("FILEREPO_TIMEOUT_SECS", "30"),
            ("FILEREPO_CONNECT_TIMEOUT_SECS", " 2 "),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_lookup(lookup_from(&[("FILEREPO_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("FILEREPO_TIMEOUT_SECS"));
    }
}
