//! Configuration management for HouseMind
//!
//! Configuration is loaded from `~/.housemind/config.json` (optional) and
//! then overridden by environment variables. The vendor variables
//! (`OPENAI_API_KEY`, `GROQ_MODEL`, `AI_PROVIDER`, ...) are the ones the rest
//! of the House of AI deployment already sets; `HOUSEMIND_*` variables cover
//! the remaining settings.

mod types;

pub use types::*;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::providers::ProviderKind;

/// Environment variable names for one network backend.
struct ProviderEnvVars {
    kind: ProviderKind,
    api_key: &'static str,
    model: &'static str,
    base_url: Option<&'static str>,
}

const PROVIDER_ENV_VARS: &[ProviderEnvVars] = &[
    ProviderEnvVars {
        kind: ProviderKind::OpenAI,
        api_key: "OPENAI_API_KEY",
        model: "OPENAI_MODEL",
        base_url: Some("OPENAI_BASE_URL"),
    },
    ProviderEnvVars {
        kind: ProviderKind::Anthropic,
        api_key: "ANTHROPIC_API_KEY",
        model: "ANTHROPIC_MODEL",
        base_url: None,
    },
    ProviderEnvVars {
        kind: ProviderKind::Groq,
        api_key: "GROQ_API_KEY",
        model: "GROQ_MODEL",
        base_url: None,
    },
    ProviderEnvVars {
        kind: ProviderKind::OpenRouter,
        api_key: "OPENROUTER_API_KEY",
        model: "OPENROUTER_MODEL",
        base_url: None,
    },
];

impl Config {
    /// Returns the HouseMind configuration directory path (~/.housemind)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".housemind")
    }

    /// Returns the path to the config file (~/.housemind/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration with
    /// environment overrides applied.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from the environment alone, ignoring any file.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Read a config file without applying overrides. Missing file yields
    /// the defaults.
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply process environment overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset. An API key creates the provider
    /// section if it is missing; model and base URL only adjust a section
    /// that exists (a model without a key does not make a kind configured).
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        for vars in PROVIDER_ENV_VARS {
            if let Some(key) = get(vars.api_key) {
                if let Some(provider) = self.providers.entry(vars.kind) {
                    provider.api_key = Some(key);
                }
            }
            let Some(provider) = self.providers.entry_if_present(vars.kind) else {
                continue;
            };
            if let Some(model) = get(vars.model) {
                provider.model = Some(model);
            }
            if let Some(base_url) = vars.base_url.and_then(|name| get(name)) {
                provider.base_url = Some(base_url);
            }
        }

        if let Some(val) = get("APP_NAME") {
            self.app_name = val;
        }
        if let Some(val) = get("SITE_URL") {
            self.site_url = Some(val);
        }
        if let Some(val) = get("AI_PROVIDER") {
            match val.parse::<ProviderKind>() {
                Ok(kind) => self.preferred_provider = Some(kind),
                Err(e) => warn!(value = %val, error = %e, "Ignoring unrecognised AI_PROVIDER"),
            }
        }

        if let Some(val) = get("HOUSEMIND_REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                self.request_timeout_secs = v;
            }
        }
        if let Some(val) = get("HOUSEMIND_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = get("HOUSEMIND_LOG_FORMAT") {
            if let Ok(v) = val.parse() {
                self.logging.format = v;
            }
        }
        if let Some(val) = get("HOUSEMIND_ROOM_CACHE_CAPACITY") {
            if let Ok(v) = val.parse() {
                self.room_cache.capacity = v;
            }
        }
        if let Some(val) = get("HOUSEMIND_ROOM_SCHEMA_PATH") {
            self.room_schema_path = Some(expand_home(&val));
        }
    }

    /// Effective configuration for one kind: the provider section merged with
    /// the global application name and site URL.
    ///
    /// Returns `None` when the kind has no section (and for RuleBased).
    pub fn provider_config(&self, kind: ProviderKind) -> Option<ProviderConfig> {
        let mut cfg = self.providers.get(kind)?.clone();
        if cfg.app_name.is_none() {
            cfg.app_name = Some(self.app_name.clone());
        }
        if cfg.site_url.is_none() {
            cfg.site_url = self.site_url.clone();
        }
        Some(cfg)
    }

    /// Kinds with a usable (non-empty) API key, in priority order.
    pub fn configured_kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::PRIORITY
            .iter()
            .copied()
            .filter(|kind| {
                self.providers
                    .get(*kind)
                    .and_then(ProviderConfig::api_key)
                    .is_some()
            })
            .collect()
    }
}

impl ProvidersConfig {
    fn entry_if_present(&mut self, kind: ProviderKind) -> Option<&mut ProviderConfig> {
        match kind {
            ProviderKind::OpenAI => self.openai.as_mut(),
            ProviderKind::Anthropic => self.anthropic.as_mut(),
            ProviderKind::Groq => self.groq.as_mut(),
            ProviderKind::OpenRouter => self.openrouter.as_mut(),
            ProviderKind::RuleBased => None,
        }
    }
}

/// Expand ~ to home directory in a path string
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
