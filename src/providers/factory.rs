//! Provider registry, construction and auto-selection.
//!
//! This module centralizes provider metadata and the mapping from
//! configuration to a live [`HouseProvider`].

use std::time::Duration;

use tracing::{debug, info, warn};

use super::claude::ANTHROPIC_PROFILE;
use super::groq::GROQ_PROFILE;
use super::network::{NetworkProvider, ProviderProfile};
use super::openai::OPENAI_PROFILE;
use super::openrouter::OPENROUTER_PROFILE;
use super::rule_based::RuleBasedProvider;
use super::types::{HouseProvider, ProviderInfo, ProviderKind};
use crate::config::{Config, ProviderConfig};
use crate::error::{ProviderError, Result};

/// Metadata describing one registered backend.
#[derive(Clone, Copy)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Environment variable holding the API key (`None` for local kinds).
    pub env_key: Option<&'static str>,
    /// Network profile (`None` for local kinds).
    pub profile: Option<&'static ProviderProfile>,
}

/// Provider registry in priority order.
///
/// Auto-selection walks this order after the preferred kind.
pub static PROVIDER_REGISTRY: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::OpenAI,
        env_key: Some("OPENAI_API_KEY"),
        profile: Some(&OPENAI_PROFILE),
    },
    ProviderSpec {
        kind: ProviderKind::Anthropic,
        env_key: Some("ANTHROPIC_API_KEY"),
        profile: Some(&ANTHROPIC_PROFILE),
    },
    ProviderSpec {
        kind: ProviderKind::Groq,
        env_key: Some("GROQ_API_KEY"),
        profile: Some(&GROQ_PROFILE),
    },
    ProviderSpec {
        kind: ProviderKind::OpenRouter,
        env_key: Some("OPENROUTER_API_KEY"),
        profile: Some(&OPENROUTER_PROFILE),
    },
    ProviderSpec {
        kind: ProviderKind::RuleBased,
        env_key: None,
        profile: None,
    },
];

/// Registry entry for a kind.
pub fn provider_spec(kind: ProviderKind) -> Option<&'static ProviderSpec> {
    PROVIDER_REGISTRY.iter().find(|spec| spec.kind == kind)
}

/// Build a configuration from the process environment alone.
///
/// A kind whose API key variable is unset or empty gets no provider section.
pub fn config_from_environment() -> Config {
    Config::from_env()
}

// ============================================================================
// Provider Factory
// ============================================================================

/// Builds providers from a [`Config`].
pub struct ProviderFactory {
    config: Config,
}

impl ProviderFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Factory over [`config_from_environment`].
    pub fn from_env() -> Self {
        Self::new(config_from_environment())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs.max(1))
    }

    /// Build and initialize a provider of `kind` with explicit settings.
    ///
    /// A network provider without credentials is still returned; it reports
    /// itself unavailable.
    ///
    /// # Errors
    /// [`ProviderError::Configuration`] when `kind` has no registry entry.
    pub fn create(
        &self,
        kind: ProviderKind,
        provider_config: &ProviderConfig,
    ) -> Result<Box<dyn HouseProvider>> {
        let spec = provider_spec(kind).ok_or_else(|| {
            ProviderError::Configuration(format!("no provider registered for '{}'", kind))
        })?;

        let mut provider: Box<dyn HouseProvider> = match spec.profile {
            Some(profile) => Box::new(NetworkProvider::from_config(
                profile,
                provider_config,
                self.timeout(),
            )),
            None => Box::new(RuleBasedProvider::new()),
        };
        provider.initialize();
        debug!(
            provider = %kind,
            model = %provider.model(),
            available = provider.check_availability(),
            "Provider created"
        );
        Ok(provider)
    }

    /// Build a provider of `kind` from this factory's configuration.
    pub fn create_configured(&self, kind: ProviderKind) -> Result<Box<dyn HouseProvider>> {
        let provider_config = self.config.provider_config(kind).unwrap_or_default();
        self.create(kind, &provider_config)
    }

    /// Pick the first available provider: the preferred kind if it is
    /// available, then the fixed priority order. Never fails; RuleBased is
    /// always available.
    pub fn auto_select(&self) -> Box<dyn HouseProvider> {
        if let Some(preferred) = self.config.preferred_provider {
            match self.create_configured(preferred) {
                Ok(provider) if provider.check_availability() => {
                    info!(provider = %preferred, "Using preferred provider");
                    return provider;
                }
                Ok(_) => warn!(provider = %preferred, "Preferred provider unavailable"),
                Err(e) => warn!(provider = %preferred, error = %e, "Preferred provider rejected"),
            }
        }

        for kind in ProviderKind::PRIORITY {
            if Some(kind) == self.config.preferred_provider {
                continue;
            }
            if kind.is_network() && self.config.provider_config(kind).is_none() {
                continue;
            }
            match self.create_configured(kind) {
                Ok(provider) if provider.check_availability() => {
                    info!(provider = %kind, model = %provider.model(), "Auto-selected provider");
                    return provider;
                }
                Ok(_) => debug!(provider = %kind, "Skipping unavailable provider"),
                Err(e) => warn!(provider = %kind, error = %e, "Skipping provider"),
            }
        }

        Box::new(RuleBasedProvider::new())
    }

    /// Diagnostics for every registered kind, in priority order. Each
    /// provider is built, probed and dropped.
    pub fn enumerate_all(&self) -> Vec<ProviderInfo> {
        PROVIDER_REGISTRY
            .iter()
            .map(|spec| match self.create_configured(spec.kind) {
                Ok(provider) => provider.info(),
                Err(e) => ProviderInfo {
                    kind: spec.kind,
                    model: String::new(),
                    available: false,
                    supported: false,
                    error: Some(e.to_string()),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory_with(keys: &[ProviderKind]) -> ProviderFactory {
        let mut config = Config::default();
        for kind in keys {
            if let Some(section) = config.providers.entry(*kind) {
                *section = ProviderConfig::with_api_key("test-key");
            }
        }
        ProviderFactory::new(config)
    }

    #[test]
    fn test_registry_matches_priority() {
        let kinds: Vec<_> = PROVIDER_REGISTRY.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, ProviderKind::PRIORITY.to_vec());
    }

    #[test]
    fn test_registry_profiles_are_consistent() {
        for spec in PROVIDER_REGISTRY {
            match spec.profile {
                Some(profile) => {
                    assert_eq!(profile.kind, spec.kind);
                    assert_eq!(Some(profile.env_key), spec.env_key);
                }
                None => assert!(!spec.kind.is_network()),
            }
        }
    }

    #[test]
    fn test_create_without_key_is_unavailable() {
        let factory = factory_with(&[]);
        let provider = factory
            .create(ProviderKind::OpenAI, &ProviderConfig::default())
            .unwrap();
        assert_eq!(provider.kind(), ProviderKind::OpenAI);
        assert!(!provider.check_availability());
        assert_eq!(provider.model(), "gpt-4");
        assert!(provider.info().error.unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_create_with_key_and_model_override() {
        let factory = factory_with(&[]);
        let cfg = ProviderConfig::with_api_key("k").with_model("llama-3.3-70b");
        let provider = factory.create(ProviderKind::Groq, &cfg).unwrap();
        assert!(provider.check_availability());
        assert_eq!(provider.model(), "llama-3.3-70b");
    }

    #[test]
    fn test_auto_select_falls_back_to_rule_based() {
        let provider = factory_with(&[]).auto_select();
        assert_eq!(provider.kind(), ProviderKind::RuleBased);
        assert!(provider.check_availability());
    }

    #[test]
    fn test_auto_select_priority_order() {
        let provider = factory_with(&[ProviderKind::OpenRouter, ProviderKind::Anthropic])
            .auto_select();
        assert_eq!(provider.kind(), ProviderKind::Anthropic);
    }

    #[test]
    fn test_auto_select_prefers_configured_kind() {
        let mut factory = factory_with(&[ProviderKind::OpenAI, ProviderKind::Groq]);
        factory.config.preferred_provider = Some(ProviderKind::Groq);
        assert_eq!(factory.auto_select().kind(), ProviderKind::Groq);
    }

    #[test]
    fn test_auto_select_ignores_unavailable_preference() {
        let mut factory = factory_with(&[ProviderKind::OpenRouter]);
        factory.config.preferred_provider = Some(ProviderKind::OpenAI);
        assert_eq!(factory.auto_select().kind(), ProviderKind::OpenRouter);
    }

    #[test]
    fn test_enumerate_all_lists_every_kind() {
        let infos = factory_with(&[ProviderKind::Groq]).enumerate_all();
        assert_eq!(infos.len(), PROVIDER_REGISTRY.len());
        let available: Vec<_> = infos
            .iter()
            .filter(|i| i.available)
            .map(|i| i.kind)
            .collect();
        assert_eq!(available, vec![ProviderKind::Groq, ProviderKind::RuleBased]);
        assert!(infos.iter().all(|i| i.supported));
    }
}
