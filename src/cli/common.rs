//! Shared helpers for CLI commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use housemind::config::Config;
use housemind::house::RoomSchema;
use housemind::log_component;
use housemind::providers::{ProviderFactory, ProviderManager, RequestLogEntry};

use super::GlobalArgs;

/// Load config from `path` (or the default location) with environment
/// overrides applied.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().with_context(|| "Failed to load configuration"),
    }
}

/// Build a manager: the `--provider` choice if given, else auto-selection.
pub(crate) fn build_manager(config: Config, globals: &GlobalArgs) -> Result<ProviderManager> {
    let manager = match globals.provider {
        Some(kind) => {
            let factory = ProviderFactory::new(config);
            let mut provider_config = factory.config().provider_config(kind).unwrap_or_default();
            if let Some(model) = &globals.model {
                provider_config.model = Some(model.clone());
            }
            let provider = factory
                .create(kind, &provider_config)
                .with_context(|| format!("Failed to create provider '{}'", kind))?;
            ProviderManager::from_parts(factory, Arc::from(provider))
        }
        None => ProviderManager::new(ProviderFactory::new(config)),
    };
    manager.set_log_callback(log_request);
    Ok(manager)
}

/// Log callback: one tracing event per request.
pub(crate) fn log_request(entry: &RequestLogEntry) {
    let error = entry.error.as_deref().unwrap_or("");
    if entry.success {
        log_component!(
            info,
            "request_log",
            "Provider call",
            provider = entry.provider.as_str(),
            model = entry.model.as_str(),
            operation = entry.operation.as_str(),
            preview = entry.response_preview.as_str(),
        );
    } else {
        log_component!(
            warn,
            "request_log",
            "Provider call failed",
            provider = entry.provider.as_str(),
            model = entry.model.as_str(),
            operation = entry.operation.as_str(),
            served_by = entry.served_by.as_str(),
            error = error,
        );
    }
}

/// Load the room schema from the CLI flag or the config.
pub(crate) fn load_schema(flag: Option<&Path>, config: &Config) -> Result<Option<RoomSchema>> {
    let Some(path) = flag.or(config.room_schema_path.as_deref()) else {
        return Ok(None);
    };
    let schema = RoomSchema::load(path)
        .with_context(|| format!("Failed to load room schema from {}", path.display()))?;
    Ok(Some(schema))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
