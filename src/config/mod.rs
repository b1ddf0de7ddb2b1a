//! Runner configuration.
//!
//! Provides unified configuration with:
//! - Builder pattern
//! - JSON loading
//! - Environment overrides (`CHALLENGE_RUNNER_*`)

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::challenges::core::{DEFAULT_READ_BUFFER, FinderLayout};

pub const DEFAULT_PROGRESSION_URL: &str = "http://challenge01.root-me.org/programmation/ch1/";
pub const DEFAULT_PROGRESSION_SUBMIT_URL: &str =
    "http://challenge01.root-me.org/programmation/ch1/ep1_v.php";
pub const DEFAULT_QR_URL: &str = "http://challenge01.root-me.org/programmation/ch7/";
pub const DEFAULT_QUADRATIC_ADDR: &str = "challenge01.root-me.org:52018";
pub const DEFAULT_QUADRATIC_ROUNDS: usize = 25;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "CHALLENGE_RUNNER_";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("invalid url for {field}: {source}")]
    Url {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to parse json config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Endpoints and tunables for every puzzle kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub progression_url: Url,
    pub progression_submit_url: Url,
    pub qr_url: Url,
    pub quadratic_addr: String,
    pub quadratic_rounds: usize,
    pub read_buffer_size: usize,
    pub user_agent: Option<String>,
    pub finder_layout: FinderLayout,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            progression_url: default_url(DEFAULT_PROGRESSION_URL),
            progression_submit_url: default_url(DEFAULT_PROGRESSION_SUBMIT_URL),
            qr_url: default_url(DEFAULT_QR_URL),
            quadratic_addr: DEFAULT_QUADRATIC_ADDR.to_string(),
            quadratic_rounds: DEFAULT_QUADRATIC_ROUNDS,
            read_buffer_size: DEFAULT_READ_BUFFER,
            user_agent: None,
            finder_layout: FinderLayout::default(),
        }
    }
}

fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("built-in url is valid")
}

impl RunnerConfig {
    pub fn builder() -> RunnerConfigBuilder {
        RunnerConfigBuilder::new()
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Defaults (or the JSON file named by `CHALLENGE_RUNNER_CONFIG`) overlaid
    /// with `CHALLENGE_RUNNER_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RunnerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        let mut config = match var("CONFIG") {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };

        if let Some(raw) = var("PROGRESSION_URL") {
            config.progression_url = parse_url("progression_url", &raw)?;
        }
        if let Some(raw) = var("PROGRESSION_SUBMIT_URL") {
            config.progression_submit_url = parse_url("progression_submit_url", &raw)?;
        }
        if let Some(raw) = var("QR_URL") {
            config.qr_url = parse_url("qr_url", &raw)?;
        }
        if let Some(raw) = var("QUADRATIC_ADDR") {
            config.quadratic_addr = raw;
        }
        if let Some(raw) = var("QUADRATIC_ROUNDS") {
            config.quadratic_rounds = parse_count("quadratic_rounds", &raw)?;
        }
        if let Some(raw) = var("READ_BUFFER") {
            config.read_buffer_size = parse_count("read_buffer_size", &raw)?;
        }
        if let Some(raw) = var("USER_AGENT") {
            config.user_agent = Some(raw);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quadratic_rounds == 0 {
            return Err(invalid("quadratic_rounds", "must be at least 1"));
        }
        if self.read_buffer_size == 0 {
            return Err(invalid("read_buffer_size", "must be at least 1"));
        }
        if self.quadratic_addr.trim().is_empty() {
            return Err(invalid("quadratic_addr", "must not be empty"));
        }
        if self.finder_layout.module == 0 {
            return Err(invalid("finder_layout.module", "must be at least 1"));
        }
        if !self.finder_layout.fits_pixel_range() {
            return Err(invalid(
                "finder_layout",
                "anchor plus 7 modules overflows the pixel range",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::Url { field, source })
}

fn parse_count(field: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("expected a positive integer, got {raw:?}"),
    })
}

/// Fluent builder for [`RunnerConfig`].
pub struct RunnerConfigBuilder {
    config: RunnerConfig,
}

impl RunnerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RunnerConfig::default(),
        }
    }

    pub fn with_progression_urls(mut self, challenge: Url, submit: Url) -> Self {
        self.config.progression_url = challenge;
        self.config.progression_submit_url = submit;
        self
    }

    pub fn with_qr_url(mut self, url: Url) -> Self {
        self.config.qr_url = url;
        self
    }

    pub fn with_quadratic_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.quadratic_addr = addr.into();
        self
    }

    pub fn with_quadratic_rounds(mut self, rounds: usize) -> Self {
        self.config.quadratic_rounds = rounds;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    pub fn with_finder_layout(mut self, layout: FinderLayout) -> Self {
        self.config.finder_layout = layout;
        self
    }

    pub fn build(self) -> Result<RunnerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for RunnerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = RunnerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.quadratic_rounds, 25);
        assert_eq!(config.read_buffer_size, 1024);
        assert_eq!(config.finder_layout.module, 9);
    }

    #[test]
    fn json_keeps_defaults_for_missing_fields() {
        let config = RunnerConfig::from_json_str(
            r#"{ "quadratic_rounds": 3, "finder_layout": { "module": 4, "anchors": [[8, 8], [8, 96], [96, 8]] } }"#,
        )
        .unwrap();
        assert_eq!(config.quadratic_rounds, 3);
        assert_eq!(config.finder_layout.anchors[1], (8, 96));
        assert_eq!(config.qr_url.as_str(), DEFAULT_QR_URL);
    }

    #[test]
    fn env_overrides_are_applied() {
        let vars = HashMap::from([
            ("CHALLENGE_RUNNER_QUADRATIC_ADDR", "127.0.0.1:4000"),
            ("CHALLENGE_RUNNER_QUADRATIC_ROUNDS", "5"),
            ("CHALLENGE_RUNNER_QR_URL", "http://localhost:8080/qr/"),
        ]);
        let config =
            RunnerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.quadratic_addr, "127.0.0.1:4000");
        assert_eq!(config.quadratic_rounds, 5);
        assert_eq!(config.qr_url.as_str(), "http://localhost:8080/qr/");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let vars = HashMap::from([("CHALLENGE_RUNNER_QUADRATIC_ROUNDS", "0")]);
        let err = RunnerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "quadratic_rounds",
                ..
            }
        ));

        let vars = HashMap::from([("CHALLENGE_RUNNER_PROGRESSION_URL", "not a url")]);
        let err = RunnerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Url { field: "progression_url", .. }));
    }

    #[test]
    fn builder_validates() {
        assert!(RunnerConfig::builder().with_read_buffer_size(0).build().is_err());
        let huge = FinderLayout {
            module: u32::MAX / 4,
            anchors: [(0, 0), (0, 9), (9, 0)],
        };
        assert!(matches!(
            RunnerConfig::builder().with_finder_layout(huge).build(),
            Err(ConfigError::Invalid {
                field: "finder_layout",
                ..
            })
        ));
        let config = RunnerConfig::builder()
            .with_quadratic_addr("localhost:1")
            .with_user_agent("runner/1.0")
            .build()
            .unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("runner/1.0"));
    }
}
