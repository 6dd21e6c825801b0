//! Configuration type definitions for HouseMind
//!
//! All types implement serde traits for JSON serialization and have sensible
//! defaults, so a partial (or missing) config file is always valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::providers::ProviderKind;

/// Application name sent to aggregator backends when nothing else is set.
pub const DEFAULT_APP_NAME: &str = "The House of AI";

/// Default client-side timeout for one backend round-trip.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Main configuration struct for HouseMind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-backend credentials and overrides
    pub providers: ProvidersConfig,
    /// Kind tried before the fixed priority order during auto-selection
    pub preferred_provider: Option<ProviderKind>,
    /// Application name (sent as `X-Title` by aggregator backends)
    pub app_name: String,
    /// Site URL (sent as `HTTP-Referer` by aggregator backends)
    pub site_url: Option<String>,
    /// Client-side timeout for one backend round-trip, in seconds
    pub request_timeout_secs: u64,
    /// Logging output configuration
    pub logging: LoggingConfig,
    /// Background room pre-generation
    pub room_cache: RoomCacheConfig,
    /// Optional JSON file describing room variables and templates
    pub room_schema_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            preferred_provider: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            site_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            logging: LoggingConfig::default(),
            room_cache: RoomCacheConfig::default(),
            room_schema_path: None,
        }
    }
}

// ============================================================================
// Provider Configurations
// ============================================================================

/// All network backend configurations. A missing section means the kind is
/// not configured at all.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    /// OpenAI chat-completions configuration
    pub openai: Option<ProviderConfig>,
    /// Anthropic messages configuration
    pub anthropic: Option<ProviderConfig>,
    /// Groq configuration
    pub groq: Option<ProviderConfig>,
    /// OpenRouter configuration
    pub openrouter: Option<ProviderConfig>,
}

impl ProvidersConfig {
    /// Config section for a kind. RuleBased never has one.
    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        match kind {
            ProviderKind::OpenAI => self.openai.as_ref(),
            ProviderKind::Anthropic => self.anthropic.as_ref(),
            ProviderKind::Groq => self.groq.as_ref(),
            ProviderKind::OpenRouter => self.openrouter.as_ref(),
            ProviderKind::RuleBased => None,
        }
    }

    /// Mutable config section for a kind, created on first access.
    ///
    /// Returns `None` for RuleBased, which takes no configuration.
    pub fn entry(&mut self, kind: ProviderKind) -> Option<&mut ProviderConfig> {
        let slot = match kind {
            ProviderKind::OpenAI => &mut self.openai,
            ProviderKind::Anthropic => &mut self.anthropic,
            ProviderKind::Groq => &mut self.groq,
            ProviderKind::OpenRouter => &mut self.openrouter,
            ProviderKind::RuleBased => return None,
        };
        Some(slot.get_or_insert_with(ProviderConfig::default))
    }
}

/// Generic provider configuration
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key for authentication
    pub api_key: Option<String>,
    /// Model identifier; the backend default is used when absent
    pub model: Option<String>,
    /// Custom API base URL
    pub base_url: Option<String>,
    /// Application name (aggregator backends only)
    pub app_name: Option<String>,
    /// Site URL (aggregator backends only)
    pub site_url: Option<String>,
}

impl ProviderConfig {
    /// Config carrying only an API key.
    pub fn with_api_key(api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Default::default()
        }
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// The API key, treating an empty string as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("app_name", &self.app_name)
            .field("site_url", &self.site_url)
            .finish()
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Compact single-line output
    #[default]
    Component,
    /// JSON lines
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "component" | "compact" => Ok(LogFormat::Component),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Append JSON logs to this file instead of stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Component,
            level: "info".to_string(),
            file: None,
        }
    }
}

// ============================================================================
// Room Cache Configuration
// ============================================================================

/// Background room pre-generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomCacheConfig {
    /// Maximum number of rooms kept ready
    pub capacity: usize,
    /// Number of refill tasks spawned at startup
    pub prefill: usize,
}

impl Default for RoomCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            prefill: 3,
        }
    }
}
