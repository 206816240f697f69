//! Client configuration.
//!
//! Values come from, highest precedence first: command-line flags, `JOBS_*`
//! environment variables, the TOML config file, built-in defaults.

use joblib::Url;
use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "jobs-client.toml";

pub const ENV_GATEWAY_URL: &str = "JOBS_GATEWAY_URL";
pub const ENV_GATEWAY_TIMEOUT_MS: &str = "JOBS_GATEWAY_TIMEOUT_MS";
pub const ENV_POLL_INTERVAL_MS: &str = "JOBS_POLL_INTERVAL_MS";
pub const ENV_LOG_LEVEL: &str = "JOBS_LOG_LEVEL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} in {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub gateway: GatewaySettings,
    pub monitor: MonitorSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Base url of the job gateway
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Wait between two status fetches while a job is running
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Log to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: joblib::DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

impl CliConfig {
    /// Load the config file (the given one, or `./jobs-client.toml` if it
    /// exists) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load_from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        debug!(?config, "loaded client configuration");
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `JOBS_*` overrides, looking variables up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_GATEWAY_URL) {
            self.gateway.base_url = url;
        }
        if let Some(timeout) = lookup(ENV_GATEWAY_TIMEOUT_MS) {
            self.gateway.timeout_ms = parse_millis(ENV_GATEWAY_TIMEOUT_MS, timeout)?;
        }
        if let Some(interval) = lookup(ENV_POLL_INTERVAL_MS) {
            self.monitor.poll_interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, interval)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn apply_args(&mut self, server: Option<&str>, timeout_ms: Option<u64>) {
        if let Some(server) = server {
            self.gateway.base_url = server.to_string();
        }
        if let Some(timeout_ms) = timeout_ms {
            self.gateway.timeout_ms = timeout_ms;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway_url()?;
        if self.gateway.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "gateway.timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.monitor.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "monitor.poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn gateway_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.gateway.base_url).map_err(|e| ConfigError::Invalid {
            field: "gateway.base_url",
            reason: format!("{}: {}", self.gateway.base_url, e),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid {
                field: "gateway.base_url",
                reason: format!("unsupported scheme {}", scheme),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.gateway.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.poll_interval_ms)
    }
}

fn parse_millis(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_gateway_conventions() {
        let config = CliConfig::default();
        assert_eq!(config.gateway.base_url, "http://localhost:5000/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.logging.level, "warn");
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs-client.toml");
        std::fs::write(
            &path,
            "[gateway]\nbase_url = \"http://jobs.internal:8080/api/\"\n\n[logging]\nfile = \"client.log\"\n",
        )
        .unwrap();

        let config = CliConfig::load_from_file(&path).unwrap();
        assert_eq!(config.gateway.base_url, "http://jobs.internal:8080/api/");
        assert_eq!(config.gateway.timeout_ms, 30_000);
        assert_eq!(config.logging.file, Some(PathBuf::from("client.log")));
        assert_eq!(config.monitor, MonitorSettings::default());
    }

    #[test]
    fn missing_or_broken_files_are_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            CliConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[gateway\n").unwrap();
        assert!(matches!(
            CliConfig::load_from_file(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_GATEWAY_URL, "http://from-env:5000/"),
            (ENV_GATEWAY_TIMEOUT_MS, "1500"),
            (ENV_POLL_INTERVAL_MS, "200"),
        ]);
        let mut config = CliConfig::default();
        config
            .apply_env_overrides(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.gateway.base_url, "http://from-env:5000/");
        assert_eq!(config.gateway.timeout_ms, 1500);
        assert_eq!(config.poll_interval(), Duration::from_millis(200));

        config.apply_args(Some("http://from-flag:5000/"), None);
        assert_eq!(config.gateway.base_url, "http://from-flag:5000/");
        assert_eq!(config.gateway.timeout_ms, 1500);
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let mut config = CliConfig::default();
        let err = config
            .apply_env_overrides(|var| (var == ENV_POLL_INTERVAL_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: ENV_POLL_INTERVAL_MS,
                ..
            }
        ));
    }

    #[test]
    fn validation_catches_unusable_values() {
        let mut config = CliConfig::default();
        config.gateway.base_url = "ftp://files".to_string();
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.gateway.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.monitor.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
