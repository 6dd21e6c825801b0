//! Generation commands, served through the provider manager.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use housemind::config::Config;
use housemind::house::{BehaviorRequest, RoomCache};

use super::common::{build_manager, load_schema, print_json};
use super::GlobalArgs;

pub(crate) async fn cmd_welcome(config: Config, globals: &GlobalArgs) -> Result<()> {
    let manager = build_manager(config, globals)?;
    let message = manager.generate_welcome_message().await;
    print_json(&json!({ "message": message }))
}

pub(crate) async fn cmd_respond(
    config: Config,
    globals: &GlobalArgs,
    action: &str,
    room: Option<&str>,
) -> Result<()> {
    let manager = build_manager(config, globals)?;
    let mut request = BehaviorRequest::new(action);
    if let Some(room) = room {
        request = request.in_room(room);
    }
    let response = manager.generate_behavior_response(&request).await;
    print_json(&response)
}

pub(crate) async fn cmd_room(
    config: Config,
    globals: &GlobalArgs,
    index: u32,
    schema_path: Option<PathBuf>,
    cached: bool,
) -> Result<()> {
    let schema = load_schema(schema_path.as_deref(), &config)?;
    let cache_config = config.room_cache.clone();
    let manager = build_manager(config, globals)?;

    let room = if cached {
        let cache = RoomCache::new(
            manager.primary_provider(),
            cache_config.capacity,
            schema.map(Arc::new),
        );
        cache.prefill_and_wait(cache_config.prefill).await;
        cache.next_room().await
    } else {
        manager.generate_room(index, schema.as_ref()).await
    };
    print_json(&room)
}

pub(crate) async fn cmd_stream(
    config: Config,
    globals: &GlobalArgs,
    context: &str,
    room_data: Option<&str>,
) -> Result<()> {
    let room_data: Value = match room_data {
        Some(raw) => serde_json::from_str(raw).with_context(|| "--room-data is not valid JSON")?,
        None => json!({}),
    };
    let manager = build_manager(config, globals)?;
    let stream = manager.generate_consciousness_stream(context, &room_data).await;
    print_json(&stream)
}

pub(crate) async fn cmd_refresh(config: Config, globals: &GlobalArgs) -> Result<()> {
    let manager = build_manager(config, globals)?;
    let refresh = manager.generate_refresh_message().await;
    print_json(&refresh)
}
