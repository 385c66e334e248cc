use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TwinToneError};

/// Top-level configuration for the TwinTone service.
///
/// Loaded from `~/.twintone/config.toml` by default. Every section is
/// optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwinToneConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl TwinToneConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TwinToneConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the pipeline cannot operate with.
    pub fn validate(&self) -> Result<()> {
        let g = &self.generation;
        if g.max_attempts == 0 {
            return Err(TwinToneError::Config(
                "generation.max_attempts must be at least 1".to_string(),
            ));
        }
        if g.attempt_timeout_secs == 0 {
            return Err(TwinToneError::Config(
                "generation.attempt_timeout_secs must be positive".to_string(),
            ));
        }
        if g.model.trim().is_empty() {
            return Err(TwinToneError::Config(
                "generation.model must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&g.temperature) {
            return Err(TwinToneError::Config(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                g.temperature
            )));
        }

        let gw = &self.gateway;
        if gw.max_query_chars == 0 || gw.max_user_id_chars == 0 {
            return Err(TwinToneError::Config(
                "gateway input limits must be positive".to_string(),
            ));
        }
        if gw.max_history_limit == 0 || gw.default_history_limit == 0 {
            return Err(TwinToneError::Config(
                "gateway history limits must be positive".to_string(),
            ));
        }
        if gw.default_history_limit > gw.max_history_limit {
            return Err(TwinToneError::Config(format!(
                "gateway.default_history_limit ({}) exceeds gateway.max_history_limit ({})",
                gw.default_history_limit, gw.max_history_limit
            )));
        }
        if gw.generation_timeout_secs == 0 {
            return Err(TwinToneError::Config(
                "gateway.generation_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the SQLite database.
    pub data_dir: String,
    /// Database file name inside `data_dir`.
    pub database_file: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Interface the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.twintone/data".to_string(),
            database_file: "twintone.db".to_string(),
            log_level: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl GeneralConfig {
    /// `data_dir` with a leading `~` expanded to the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    /// Full path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.resolved_data_dir().join(&self.database_file)
    }
}

/// Which generation backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions endpoint.
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Deterministic offline backend.
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mock => "mock",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = TwinToneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(TwinToneError::Config(format!(
                "unknown generation provider '{}'. Must be one of: openai, mock",
                other
            ))),
        }
    }
}

/// Generation backend and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    /// Model name sent to the backend.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Timeout for a single backend attempt, in seconds.
    pub attempt_timeout_secs: u64,
    /// Total attempts per tone, including the first.
    pub max_attempts: u32,
    /// Backoff before the first retry, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound on any single backoff, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            attempt_timeout_secs: 30,
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl GenerationConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Tone orchestration settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Run a second, tone-preserving refinement pass on each answer.
    pub refine: bool,
}

/// Request validation and timeout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Maximum query length in characters.
    pub max_query_chars: usize,
    /// Maximum user id length in characters.
    pub max_user_id_chars: usize,
    /// History page size when the caller does not pass `limit`.
    pub default_history_limit: u32,
    /// Largest accepted history `limit`.
    pub max_history_limit: u32,
    /// Upper bound on the combined duration of both tone generations.
    pub generation_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_query_chars: 4_000,
            max_user_id_chars: 128,
            default_history_limit: 10,
            max_history_limit: 100,
            generation_timeout_secs: 90,
        }
    }
}

impl GatewayConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

/// Expand `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}
