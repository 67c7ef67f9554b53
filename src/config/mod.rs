use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config file '{path}': {source}")]
  Read {
    path: String,
    source: std::io::Error,
  },
  #[error("Failed to parse config file '{path}': {source}")]
  Parse {
    path: String,
    source: toml::de::Error,
  },
  #[error("Invalid port '{0}'")]
  InvalidPort(String),
}

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stdout
  pub file: Option<String>,
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: default_log_level(),
    }
  }
}

/// Jokebox configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
  /// HTTP listening port
  pub port: u16,

  /// Interface the HTTP server binds to
  pub bind_host: String,

  /// JSON file the jokes are persisted to
  pub jokes_file: PathBuf,

  /// Whether submissions are accepted at startup
  pub submissions_open: bool,

  /// Log configuration
  pub log: LogConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: 3000,
      bind_host: "0.0.0.0".to_string(),
      jokes_file: PathBuf::from("jokes.json"),
      submissions_open: true,
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from TOML file
  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_string(),
      source,
    })?;

    toml::from_str(&config_str).map_err(|source| ConfigError::Parse {
      path: path.to_string(),
      source,
    })
  }

  /// Apply overrides from the process environment
  pub fn apply_env(&mut self) -> Result<(), ConfigError> {
    self.apply_port(std::env::var(PORT_ENV).ok().as_deref())
  }

  fn apply_port(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
    if let Some(raw) = port {
      self.port = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
    }
    Ok(())
  }

  /// Socket address the server binds to
  pub fn server_addr(&self) -> String {
    format!("{}:{}", self.bind_host, self.port)
  }
}
