//! Provider diagnostics: `providers` and `probe`.

use anyhow::{bail, Context, Result};
use serde_json::json;

use housemind::config::Config;
use housemind::house::BehaviorRequest;
use housemind::providers::{HouseProvider, ProviderFactory, ProviderKind};
use housemind::utils::string::preview;

use super::common::print_json;

/// List every registered provider.
pub(crate) fn cmd_providers(config: &Config) -> Result<()> {
    let factory = ProviderFactory::new(config.clone());
    let infos = factory.enumerate_all();

    println!("Providers (priority order)");
    println!("==========================");
    for info in &infos {
        let status = if info.available { "available" } else { "unavailable" };
        let marker = if Some(info.kind) == config.preferred_provider {
            " (preferred)"
        } else {
            ""
        };
        println!("  {:<11} {:<12} {}{}", info.kind.as_str(), status, info.model, marker);
        if let Some(error) = &info.error {
            println!("              {}", error);
        }
    }

    let selected = factory.auto_select();
    println!();
    println!("Auto-selected: {} ({})", selected.kind(), selected.model());
    Ok(())
}

/// Run every operation against one provider directly, bypassing the
/// manager so failures are visible.
pub(crate) async fn cmd_probe(config: &Config, kind: ProviderKind, model: Option<&str>) -> Result<()> {
    let factory = ProviderFactory::new(config.clone());
    let mut provider_config = config.provider_config(kind).unwrap_or_default();
    if let Some(model) = model {
        provider_config.model = Some(model.to_string());
    }
    let provider = factory
        .create(kind, &provider_config)
        .with_context(|| format!("Failed to create provider '{}'", kind))?;

    let info = provider.info();
    print_json(&info)?;
    if !info.available {
        bail!("{} is not available", kind);
    }

    let failures = probe(provider.as_ref()).await;
    println!();
    if failures == 0 {
        println!("All operations succeeded.");
        Ok(())
    } else {
        bail!("{} operation(s) failed", failures)
    }
}

async fn probe(provider: &dyn HouseProvider) -> usize {
    let mut failures = 0;

    let request = BehaviorRequest::new("explore_room").in_room("library");
    match provider.generate_behavior_response(&request).await {
        Ok(response) => report("behavior", true, &response.message),
        Err(e) => {
            failures += 1;
            report("behavior", false, &e.to_string());
        }
    }

    match provider.generate_welcome_message().await {
        Ok(message) => report("welcome", true, &message),
        Err(e) => {
            failures += 1;
            report("welcome", false, &e.to_string());
        }
    }

    let room_data = json!({"id": "ROOM_101", "location": "Tokyo, Japan"});
    let stream = provider
        .generate_consciousness_stream("inspecting the room", &room_data)
        .await;
    if !stream.consciousness_update {
        failures += 1;
    }
    report("stream", stream.consciousness_update, &stream.message);

    match provider.generate_room(0, None).await {
        Ok(room) => report("room", true, &format!("{} in {}", room.id, room.location)),
        Err(e) => {
            failures += 1;
            report("room", false, &e.to_string());
        }
    }

    let refresh = provider.generate_refresh_message().await;
    if !refresh.refresh_complete {
        failures += 1;
    }
    report("refresh", refresh.refresh_complete, &refresh.message);

    failures
}

fn report(operation: &str, ok: bool, detail: &str) {
    let mark = if ok { "ok  " } else { "FAIL" };
    println!("  [{}] {:<9} {}", mark, operation, preview(detail, 100));
}
