//! Configuration types for inbrief.
//!
//! `AppConfig` represents the top-level `config.toml`. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub streaming: StreamingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

impl AppConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.streaming;
        if s.batch_size == 0 {
            return Err(ConfigError::Invalid("streaming.batch_size must be > 0".to_string()));
        }
        if s.flush_period_secs == 0 {
            return Err(ConfigError::Invalid(
                "streaming.flush_period_secs must be > 0".to_string(),
            ));
        }
        if s.flush_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "streaming.flush_timeout_secs must be > 0".to_string(),
            ));
        }
        if s.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "streaming.channel_capacity must be > 0".to_string(),
            ));
        }
        if self.notify.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("notify.topic must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Aggregation and flush settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Whether the live update stream is consumed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Events per batch before a capacity flush.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds between periodic flushes.
    #[serde(default = "default_flush_period_secs")]
    pub flush_period_secs: u64,

    /// Deadline in seconds for persisting and announcing one batch.
    #[serde(default = "default_flush_timeout_secs")]
    pub flush_timeout_secs: u64,

    /// Sanitized texts must be longer than this many characters to be kept.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Capacity of the event channels feeding the aggregator.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl StreamingConfig {
    pub fn flush_period(&self) -> Duration {
        Duration::from_secs(self.flush_period_secs)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_secs(self.flush_timeout_secs)
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: default_batch_size(),
            flush_period_secs: default_flush_period_secs(),
            flush_timeout_secs: default_flush_timeout_secs(),
            min_text_chars: default_min_text_chars(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// HTTP server bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Blob store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory. `None` means `<data dir>/blobs`.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            bucket: default_bucket(),
        }
    }
}

/// Notification topic settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_topic")]
    pub topic: String,
    /// When set, every published batch id is also POSTed here.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            webhook_url: None,
        }
    }
}

/// Where updates and chat history come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// NDJSON file of updates; `-` reads stdin.
    #[serde(default)]
    pub updates: Option<PathBuf>,
    /// JSON snapshot of chats, folders and message history.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    1000
}

fn default_flush_period_secs() -> u64 {
    5
}

fn default_flush_timeout_secs() -> u64 {
    5
}

fn default_min_text_chars() -> usize {
    50
}

fn default_channel_capacity() -> usize {
    256
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_bucket() -> String {
    "inbrief".to_string()
}

fn default_topic() -> String {
    "inbrief".to_string()
}
