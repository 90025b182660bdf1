//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// JSON journal file; `None` keeps runs in memory only
    pub journal_path: Option<PathBuf>,
    /// How often the elapsed time string refreshes
    pub stopwatch_interval: Duration,
    /// How often a location is sampled and distance/pace refresh
    pub sample_interval: Duration,
    /// Location requests slower than this count as unavailable
    pub location_timeout: Duration,
    /// Whether location permission starts out granted
    pub location_permission: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            journal_path: None,
            stopwatch_interval: Duration::from_millis(1000),
            sample_interval: Duration::from_millis(4000),
            location_timeout: Duration::from_millis(10_000),
            location_permission: false,
        }
    }
}

impl Config {
    /// Default config for tests: in-memory journal, permission granted.
    pub fn test_default() -> Self {
        Self {
            location_permission: true,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            journal_path: env::var("JOURNAL_PATH")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            stopwatch_interval: interval_var("STOPWATCH_INTERVAL_MS")?
                .unwrap_or(defaults.stopwatch_interval),
            sample_interval: interval_var("SAMPLE_INTERVAL_MS")?
                .unwrap_or(defaults.sample_interval),
            location_timeout: interval_var("LOCATION_TIMEOUT_MS")?
                .unwrap_or(defaults.location_timeout),
            location_permission: parse_var("LOCATION_PERMISSION")?
                .unwrap_or(defaults.location_permission),
        })
    }
}

/// Parse an optional variable; present but malformed is an error.
fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Millisecond period; zero is rejected.
fn interval_var(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match parse_var::<u64>(name)? {
        Some(0) => Err(ConfigError::Invalid(name, "0".to_string())),
        Some(ms) => Ok(Some(Duration::from_millis(ms))),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-wide; keep every env mutation in
    // this one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("PORT", "9090");
        env::set_var("JOURNAL_PATH", "/tmp/runs.json");
        env::set_var("SAMPLE_INTERVAL_MS", "2000");
        env::set_var("LOCATION_PERMISSION", "true");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 9090);
        assert_eq!(config.journal_path, Some(PathBuf::from("/tmp/runs.json")));
        assert_eq!(config.sample_interval, Duration::from_millis(2000));
        assert_eq!(config.stopwatch_interval, Duration::from_millis(1000));
        assert!(config.location_permission);

        env::set_var("SAMPLE_INTERVAL_MS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("SAMPLE_INTERVAL_MS", _))
        ));

        env::set_var("SAMPLE_INTERVAL_MS", "soon");
        assert!(Config::from_env().is_err());

        for name in ["PORT", "JOURNAL_PATH", "SAMPLE_INTERVAL_MS", "LOCATION_PERMISSION"] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_default_timer_periods() {
        let config = Config::default();
        assert_eq!(config.stopwatch_interval, Duration::from_secs(1));
        assert_eq!(config.sample_interval, Duration::from_secs(4));
        assert!(config.journal_path.is_none());
    }
}
