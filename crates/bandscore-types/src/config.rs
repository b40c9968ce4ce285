//! Application configuration types for Bandscore.
//!
//! `AppConfig` represents `bandscore.toml`. Every field has a default so an
//! empty or missing file yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::task::WordCountPolicy;

/// Top-level configuration, loaded from `~/.bandscore/bandscore.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the band-descriptor files (plain or `.enc`).
    #[serde(default = "default_criteria_dir")]
    pub criteria_dir: PathBuf,

    /// Whether the task minimum word count blocks evaluation.
    #[serde(default)]
    pub word_count_policy: WordCountPolicy,

    /// Hosted-model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Replacement for the built-in examiner instruction.
    ///
    /// The `PROMPT_TEMPLATE` secret takes precedence over this value.
    #[serde(default)]
    pub prompt_template: Option<String>,
}

fn default_criteria_dir() -> PathBuf {
    PathBuf::from("tasks")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            criteria_dir: default_criteria_dir(),
            word_count_policy: WordCountPolicy::default(),
            model: ModelConfig::default(),
            server: ServerConfig::default(),
            prompt_template: None,
        }
    }
}

/// Settings for the hosted text-generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model_name() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_output_tokens() -> u32 {
    4000
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            temperature: 0.0,
            max_output_tokens: default_max_output_tokens(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bind address and session limits for `bandscore serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wizard sessions untouched for this long are dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    /// Upper bound on live wizard sessions; the least recently used is
    /// evicted to make room.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_session_idle_secs() -> u64 {
    60 * 60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}
