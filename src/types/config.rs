//! Configuration for Hermes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::HermesResult;

/// Main configuration for Hermes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Learning pipeline settings.
    #[serde(default)]
    pub learning: LearningConfig,

    /// Chat turn settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Available document store backends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite file at `db_path`.
    Sqlite,
    /// Process memory; lost on exit.
    Memory,
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend used by the CLI.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            db_path: default_db_path(),
        }
    }
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".hermes/hermes.db")
}

/// What to drop when a topic accumulates more examples than `max_examples`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExampleEviction {
    /// Keep the first `max_examples` of `existing ++ new` (new ones are lost).
    #[default]
    DropNewest,
    /// Keep the last `max_examples` of `existing ++ new`.
    DropOldest,
}

/// Learning pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum time between two extraction runs (in hours).
    #[serde(default = "default_analysis_interval")]
    pub analysis_interval_hours: u64,

    /// Maximum number of unanalyzed conversations read per run.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of examples kept per topic.
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,

    /// Maximum number of candidate responses kept per topic.
    #[serde(default = "default_max_responses")]
    pub max_responses: usize,

    /// Maximum number of responses taken from a single pattern.
    #[serde(default = "default_max_new_responses")]
    pub max_new_responses: usize,

    /// A response must be strictly longer than this (in UTF-16 code units).
    #[serde(default = "default_min_response_chars")]
    pub min_response_chars: usize,

    /// Confidence of a freshly created knowledge record.
    #[serde(default = "default_initial_confidence")]
    pub initial_confidence: f64,

    /// Confidence added on every merge.
    #[serde(default = "default_confidence_step")]
    pub confidence_step: f64,

    /// Confidence ceiling.
    #[serde(default = "default_max_confidence")]
    pub max_confidence: f64,

    /// Truncation direction for merged examples.
    #[serde(default)]
    pub example_eviction: ExampleEviction,

    /// Responses containing any of these phrases are never learned.
    #[serde(default = "default_boilerplate_phrases")]
    pub boilerplate_phrases: Vec<String>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            analysis_interval_hours: default_analysis_interval(),
            batch_size: default_batch_size(),
            max_examples: default_max_examples(),
            max_responses: default_max_responses(),
            max_new_responses: default_max_new_responses(),
            min_response_chars: default_min_response_chars(),
            initial_confidence: default_initial_confidence(),
            confidence_step: default_confidence_step(),
            max_confidence: default_max_confidence(),
            example_eviction: ExampleEviction::default(),
            boilerplate_phrases: default_boilerplate_phrases(),
        }
    }
}

impl LearningConfig {
    /// Interval as a chrono duration.
    ///
    /// Values chrono cannot represent fall back to 24 hours.
    pub fn analysis_interval(&self) -> chrono::TimeDelta {
        i64::try_from(self.analysis_interval_hours)
            .ok()
            .and_then(chrono::TimeDelta::try_hours)
            .unwrap_or_else(|| {
                tracing::warn!(
                    hours = self.analysis_interval_hours,
                    "analysis_interval_hours out of range, using 24"
                );
                chrono::TimeDelta::hours(default_analysis_interval() as i64)
            })
    }
}

fn default_true() -> bool {
    true
}

fn default_analysis_interval() -> u64 {
    24
}

fn default_batch_size() -> usize {
    100
}

fn default_max_examples() -> usize {
    50
}

fn default_max_responses() -> usize {
    5
}

fn default_max_new_responses() -> usize {
    3
}

fn default_min_response_chars() -> usize {
    50
}

fn default_initial_confidence() -> f64 {
    0.70
}

fn default_confidence_step() -> f64 {
    0.01
}

fn default_max_confidence() -> f64 {
    0.95
}

fn default_boilerplate_phrases() -> Vec<String> {
    vec![
        "Entendi sua mensagem".to_string(),
        "Estou em fase inicial".to_string(),
    ]
}

/// Chat turn settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Learned responses are used only above this confidence.
    #[serde(default = "default_response_threshold")]
    pub response_threshold: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            response_threshold: default_response_threshold(),
        }
    }
}

fn default_response_threshold() -> f64 {
    0.75
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> HermesResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> HermesResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            storage: StorageConfig::default(),
            learning: LearningConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
