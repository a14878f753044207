//! Configuration loading and typed config structures for a Deltastream node.
//!
//! The configuration lives in `deltastream.yaml`. Every field has a default,
//! so an empty or missing file yields a runnable single-node setup.
//!
//! Environment variables override YAML values:
//! - `DELTASTREAM_NODE_NAME` overrides `node.name`
//! - `DELTASTREAM_NODE_ADDR` overrides `node.address`
//! - `DELTASTREAM_WEB_ADDR` overrides `web.bind_addr`

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeltastreamConfig {
    /// Identity and limits of the local engine.
    #[serde(default)]
    pub node: NodeConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub web: WebConfig,

    /// Event queue settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeltastreamConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_with(yaml, |name| std::env::var(name).ok())
    }

    /// Like [`parse`](Self::parse), but reads overrides through `lookup`
    /// instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn parse_with<F>(yaml: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Apply `DELTASTREAM_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `DELTASTREAM_NODE_NAME`, `DELTASTREAM_NODE_ADDR` and
    /// `DELTASTREAM_WEB_ADDR` as resolved by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DELTASTREAM_NODE_NAME") {
            self.node.name = val;
        }
        if let Some(val) = lookup("DELTASTREAM_NODE_ADDR") {
            self.node.address = val;
        }
        if let Some(val) = lookup("DELTASTREAM_WEB_ADDR") {
            self.web.bind_addr = val;
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.name.trim().is_empty() {
            return Err(ConfigError::Invalid("node.name must not be empty".to_owned()));
        }
        if self.queue.capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue.capacity must be at least 1".to_owned(),
            ));
        }
        if self.node.max_value_bytes == 0 {
            return Err(ConfigError::Invalid(
                "node.max_value_bytes must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Identity and limits of the local engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// Node name announced to the cluster.
    #[serde(default = "default_node_name")]
    pub name: String,

    /// Cluster listen address (`host:port`).
    #[serde(default = "default_node_address")]
    pub address: String,

    /// Largest accepted delta value in bytes.
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: default_node_name(),
            address: default_node_address(),
            max_value_bytes: default_max_value_bytes(),
        }
    }
}

fn default_node_name() -> String {
    String::from("node-a")
}

fn default_node_address() -> String {
    String::from("127.0.0.1:8081")
}

const fn default_max_value_bytes() -> usize {
    1024
}

/// HTTP gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebConfig {
    /// Listen address for the HTTP gateway (`host:port`).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory of a prebuilt UI bundle to serve for unmatched paths.
    #[serde(default)]
    pub ui_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            ui_dir: None,
        }
    }
}

fn default_bind_addr() -> String {
    String::from("127.0.0.1:9091")
}

/// Event queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of buffered envelopes.
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
        }
    }
}

const fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}
