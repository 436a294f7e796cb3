// Configuration for the two upstream services. Loaded from a TOML file in
// the user's config directory, then patched from environment variables and
// command-line flags (in that order).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_INTENT_KEY: &str = "DIAMOND_QUERY_INTENT_KEY";
pub const ENV_INTENT_ENDPOINT: &str = "DIAMOND_QUERY_INTENT_ENDPOINT";
pub const ENV_STATS_URL: &str = "DIAMOND_QUERY_STATS_URL";

const DEFAULT_INTENT_ENDPOINT: &str =
    "https://westus.api.cognitive.microsoft.com/luis/v2.0/apps/fc1607f9-58d5-4aec-bf84-b8ef7421a200";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout. `None` means requests may block indefinitely.
    pub timeout_secs: Option<u64>,
    pub intent: IntentConfig,
    pub stats: StatsConfig,
}

/// Settings for the natural-language intent classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    pub endpoint: String,
    pub subscription_key: String,
    pub verbose: bool,
    pub timezone_offset: i32,
}

/// Settings for the stats lookup service. Season, league and game type
/// scope every hitting-statistics request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub base_url: String,
    pub season: String,
    pub league: String,
    pub game_type: String,
    pub sport_code: String,
    pub active_only: bool,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INTENT_ENDPOINT.into(),
            subscription_key: String::new(),
            verbose: true,
            timezone_offset: -360,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://lookup-service-prod.mlb.com/".into(),
            season: "2017".into(),
            league: "mlb".into(),
            game_type: "R".into(),
            sport_code: "mlb".into(),
            active_only: true,
        }
    }
}

impl Config {
    /// Load the config at `path`. A missing file is not an error: the
    /// defaults are returned instead.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)?;
        Ok(())
    }

    /// Default location: `<config_dir>/diamond-query/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("diamond-query")
            .join("config.toml")
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names. Empty
    /// values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_INTENT_KEY) {
            self.intent.subscription_key = key;
        }
        if let Some(endpoint) = get(ENV_INTENT_ENDPOINT) {
            self.intent.endpoint = endpoint;
        }
        if let Some(base) = get(ENV_STATS_URL) {
            self.stats.base_url = base;
        }
    }

    /// Check that both service URLs parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.intent_endpoint()?;
        self.stats_base()?;
        Ok(())
    }

    pub fn intent_endpoint(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.intent.endpoint).map_err(|source| ConfigError::InvalidUrl {
            field: "intent.endpoint",
            source,
        })
    }

    /// Base URL of the stats service. A trailing slash is added when missing
    /// so relative endpoint paths join under it rather than replacing the
    /// last segment.
    pub fn stats_base(&self) -> Result<Url, ConfigError> {
        let mut base = self.stats.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).map_err(|source| ConfigError::InvalidUrl {
            field: "stats.base_url",
            source,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_legacy_endpoints() {
        let cfg = Config::default();
        assert_eq!(cfg.stats.season, "2017");
        assert_eq!(cfg.stats.league, "mlb");
        assert_eq!(cfg.stats.game_type, "R");
        assert!(cfg.timeout_secs.is_none());
        assert!(cfg.intent.subscription_key.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = 5\n[stats]\nseason = \"2016\"\n").unwrap();

        let cfg = Config::load_from_file(&path).unwrap();
        assert_eq!(cfg.stats.season, "2016");
        assert_eq!(cfg.stats.league, "mlb");
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[stats\nseason = ").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.intent.subscription_key = "abc123".into();
        cfg.stats.season = "2015".into();

        cfg.save_to_file(&path).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), cfg);
    }

    #[test]
    fn env_overrides_skip_blank_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_INTENT_KEY, "secret"),
            (ENV_STATS_URL, "  "),
        ]
        .into_iter()
        .collect();

        let mut cfg = Config::default();
        cfg.apply_env_with(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.intent.subscription_key, "secret");
        assert_eq!(cfg.stats.base_url, StatsConfig::default().base_url);
    }

    #[test]
    fn stats_base_gets_trailing_slash() {
        let mut cfg = Config::default();
        cfg.stats.base_url = "http://localhost:9000/api".into();
        assert_eq!(cfg.stats_base().unwrap().as_str(), "http://localhost:9000/api/");
    }

    #[test]
    fn invalid_url_fails_validation() {
        let mut cfg = Config::default();
        cfg.intent.endpoint = "not a url".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidUrl { field: "intent.endpoint", .. })
        ));
    }
}
