//! # Configuration
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then `NEWS_INTEGRATIONS_*` environment variables
//! (`__` separates sections, e.g. `NEWS_INTEGRATIONS_NEWSAPI__TIMEOUT_SECS`).
//! CLI flags are applied last through [`ConfigOverrides`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "NEWS_INTEGRATIONS";

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub newsapi: NewsApiConfig,
    pub logging: LoggingConfig,
}

/// Settings for the NewsAPI client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    /// API root; `/sources` is appended
    pub base_url: String,
    /// Whole-request timeout
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            timeout_secs: 10,
            user_agent: format!("news-integrations/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NewsApiConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable logs
    #[default]
    Human,
    /// Single line, terse
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse from string (case-insensitive)
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Human,
        }
    }
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Values set on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides and re-validate
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(base_url) = &overrides.base_url {
            self.newsapi.base_url.clone_from(base_url);
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.newsapi.timeout_secs = timeout_secs;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level.clone_from(level);
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.newsapi.base_url).map_err(|e| Error::InvalidInput {
            field: "newsapi.base_url".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidInput {
                field: "newsapi.base_url".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.newsapi.timeout_secs == 0 {
            return Err(Error::InvalidInput {
                field: "newsapi.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::InvalidInput {
                field: "logging.level".to_string(),
                reason: format!("unknown level '{}'", self.logging.level),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.newsapi.base_url, "https://newsapi.org/v2");
        assert_eq!(config.newsapi.timeout(), Duration::from_secs(10));
        assert!(config.newsapi.user_agent.starts_with("news-integrations/"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Human);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();

        config.newsapi.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));

        config.newsapi.base_url = "ftp://newsapi.org/v2".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
        config.newsapi.base_url = "http://localhost:8080/v2".to_string();
        assert!(config.validate().is_ok());

        config.newsapi.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
        config.newsapi.timeout_secs = 5;

        config.logging.level = "chatty".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = toml_file();
        writeln!(
            file,
            "[newsapi]\nbase_url = \"http://127.0.0.1:9999/v2\"\ntimeout_secs = 3\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.newsapi.base_url, "http://127.0.0.1:9999/v2");
        assert_eq!(config.newsapi.timeout_secs, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
        // untouched keys keep their defaults
        assert_eq!(config.logging.level, "info");
        assert!(config.newsapi.user_agent.starts_with("news-integrations/"));
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = toml_file();
        writeln!(file, "[newsapi]\ntimeout_secs = 0").unwrap();

        assert!(matches!(
            Config::load(Some(file.path())),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            base_url: Some("http://localhost:1234/v2".to_string()),
            timeout_secs: Some(2),
            log_level: Some("debug".to_string()),
            log_format: Some(LogFormat::Compact),
        };

        config.apply_overrides(&overrides).unwrap();
        assert_eq!(config.newsapi.base_url, "http://localhost:1234/v2");
        assert_eq!(config.newsapi.timeout_secs, 2);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Compact);

        let bad = ConfigOverrides {
            timeout_secs: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(config.apply_overrides(&bad).is_err());
    }

    #[test]
    fn test_log_format_from_arg() {
        assert_eq!(LogFormat::from_arg("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_arg("human"), Some(LogFormat::Human));
        assert_eq!(LogFormat::from_arg("xml"), None);
    }
}
