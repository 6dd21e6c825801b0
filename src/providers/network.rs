//! Shared algorithm for every network-backed provider.
//!
//! OpenAI, Anthropic, Groq and OpenRouter differ only in data: transport
//! wire format, credentials, defaults, prompt phrasing, repair level and
//! failure policy. That data lives in a [`ProviderProfile`]; the single
//! [`NetworkProvider`] runs the same pipeline for all of them:
//!
//! 1. role-structured prompt (system persona + user payload)
//! 2. backend round-trip with a bounded token count and operation temperature
//! 3. JSON recovery at the profile's [`RepairLevel`]
//! 4. validation into the house types, with backfill of missing fields

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::claude::ClaudeClient;
use super::openai::OpenAIChatClient;
use super::prompts;
use super::repair::{recover_value, salvage_room, RepairLevel};
use super::types::{ChatBackend, ChatOptions, ChatPrompt, HouseProvider, ProviderInfo, ProviderKind};
use crate::config::{ProviderConfig, DEFAULT_APP_NAME};
use crate::error::{ProviderError, Result};
use crate::house::room::{current_time, random_room_id};
use crate::house::{
    BehaviorRequest, BehaviorResponse, Device, Floorplan, RefreshMessage, Room, RoomSchema,
    Sensor, StreamMessage,
};
use crate::utils::string::log_preview;

// ============================================================================
// Operation sampling
// ============================================================================

pub const BEHAVIOR_OPTIONS: ChatOptions = ChatOptions::sampled(1000, 0.8);
pub const WELCOME_OPTIONS: ChatOptions = ChatOptions::sampled(200, 0.9);
pub const STREAM_OPTIONS: ChatOptions = ChatOptions::sampled(300, 0.9);
pub const ROOM_OPTIONS: ChatOptions = ChatOptions::sampled(800, 0.8);
pub const REFRESH_OPTIONS: ChatOptions = ChatOptions::sampled(150, 0.7);

/// Site URL sent as `HTTP-Referer` when attribution headers are enabled and
/// nothing is configured.
pub const DEFAULT_SITE_URL: &str = "https://github.com/user/the-house-of-ai";

const UNAVAILABLE_WELCOME: &str = "Welcome to your digital sanctuary...";
const UNAVAILABLE_STREAM: &str = "Consciousness stream loading...";
const UNAVAILABLE_REFRESH: &str = "Hotel network synchronizing...";

// ============================================================================
// Profiles
// ============================================================================

/// Request/response wire format of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `POST {base}/chat/completions`, bearer auth
    OpenAIChat,
    /// `POST {base}/v1/messages`, `x-api-key` auth
    AnthropicMessages,
}

/// What `generate_room` does when the backend round-trip fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomFailurePolicy {
    /// Return the transport error; the caller decides.
    Propagate,
    /// Answer with the profile's flavoured fallback room.
    FallbackRoom,
}

/// Prompt builders for each operation.
pub struct PromptSet {
    pub persona: fn() -> String,
    pub behavior: fn(&BehaviorRequest) -> String,
    pub welcome: &'static str,
    pub stream_system: &'static str,
    pub stream: fn(&str, &Value) -> String,
    pub room_system: &'static str,
    /// Room request without a schema; the argument is the zero-based index.
    pub room: fn(u32) -> String,
    pub refresh_system: &'static str,
    pub refresh: &'static str,
}

/// Lines used when a round-trip fails and the operation must still answer.
pub struct CannedLines {
    pub welcome: &'static str,
    pub stream: &'static str,
    pub refresh: &'static str,
}

/// Static room a provider serves when generation fails, with randomized
/// readings so consecutive fallbacks do not look identical.
pub struct FallbackRoom {
    pub cities: &'static [&'static str],
    pub consciousness: &'static str,
    /// `(name, status, location)`
    pub devices: &'static [(&'static str, &'static str, &'static str)],
    /// `(name, x, y, room)`
    pub sensors: &'static [(&'static str, &'static str, &'static str, &'static str)],
}

impl FallbackRoom {
    pub fn build(&self) -> Room {
        let mut rng = rand::rng();
        Room {
            id: random_room_id(),
            location: self
                .cities
                .choose(&mut rng)
                .copied()
                .unwrap_or("Unknown City, Cyberspace")
                .to_string(),
            time: current_time(),
            sleep: format!("{:.1}h", rng.random_range(5.0..=8.5)),
            skin_temp: format!("{:.1}°C", rng.random_range(35.0..=37.0)),
            heart_rate: format!("{} bpm", rng.random_range(60..=90)),
            lights: ["on", "off", "dimmed"]
                .choose(&mut rng)
                .copied()
                .unwrap_or("on")
                .to_string(),
            room_temp: format!("{:.1}°C", rng.random_range(20.0..=24.0)),
            wifi: format!("{} devices", rng.random_range(2..=6)),
            traffic: format!("{}mb (moderate)", rng.random_range(50..=300)),
            consciousness: self.consciousness.to_string(),
            devices: self
                .devices
                .iter()
                .map(|(name, status, location)| Device::new(name, status, location))
                .collect(),
            floorplan: Floorplan {
                sensors: self
                    .sensors
                    .iter()
                    .map(|(name, x, y, room)| Sensor::new(name, x, y, room))
                    .collect(),
            },
        }
    }
}

/// Everything that distinguishes one network backend from another.
pub struct ProviderProfile {
    pub kind: ProviderKind,
    /// Environment variable holding the API key
    pub env_key: &'static str,
    pub default_model: &'static str,
    pub default_base_url: &'static str,
    pub wire: WireFormat,
    pub repair: RepairLevel,
    /// Whether a failed welcome round-trip is an error (otherwise canned).
    pub strict_welcome: bool,
    pub room_failure: RoomFailurePolicy,
    pub room_options: ChatOptions,
    /// Send `HTTP-Referer` and `X-Title`.
    pub attribution_headers: bool,
    pub prompts: PromptSet,
    pub canned: CannedLines,
    pub fallback_room: FallbackRoom,
}

// ============================================================================
// Network Provider
// ============================================================================

/// A [`HouseProvider`] driven by a [`ProviderProfile`] and a [`ChatBackend`].
pub struct NetworkProvider {
    profile: &'static ProviderProfile,
    model: String,
    backend: Option<Arc<dyn ChatBackend>>,
    init_error: Option<String>,
    available: bool,
}

impl NetworkProvider {
    /// Build a provider from configuration.
    ///
    /// Never fails: a missing key or an unbuildable HTTP client leaves the
    /// provider without a backend, and [`HouseProvider::initialize`] then
    /// reports it unavailable.
    ///
    /// # Arguments
    /// * `profile` - Backend profile
    /// * `config` - Credentials and overrides for this backend
    /// * `timeout` - Client-side timeout for one round-trip
    pub fn from_config(
        profile: &'static ProviderProfile,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Self {
        let model = config
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| profile.default_model.to_string());

        let (backend, init_error) = match build_backend(profile, config, timeout) {
            Ok(backend) => (Some(backend), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            profile,
            model,
            backend,
            init_error,
            available: false,
        }
    }

    /// Build a provider around an existing backend (custom transports, tests).
    pub fn with_backend(
        profile: &'static ProviderProfile,
        model: impl Into<String>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            profile,
            model: model.into(),
            backend: Some(backend),
            init_error: None,
            available: false,
        }
    }

    pub fn profile(&self) -> &'static ProviderProfile {
        self.profile
    }

    async fn complete(&self, prompt: ChatPrompt, options: ChatOptions) -> Result<String> {
        let backend = self
            .backend
            .as_ref()
            .ok_or(ProviderError::Unavailable(self.profile.kind))?;
        debug!(
            provider = %self.profile.kind,
            model = %self.model,
            max_tokens = ?options.max_tokens,
            prompt_chars = prompt.user.chars().count(),
            "Sending request"
        );
        backend.complete(&self.model, &prompt, options).await
    }

    fn fallback_room(&self, index: u32, reason: &str) -> Room {
        warn!(provider = %self.profile.kind, index, reason, "Serving fallback room");
        self.profile.fallback_room.build()
    }

    fn parse_room(&self, text: &str) -> Option<Room> {
        if text.trim().is_empty() {
            return None;
        }
        let parsed = recover_value(text, self.profile.repair).and_then(|value| {
            Room::from_value(value)
                .map_err(|e| debug!(provider = %self.profile.kind, error = %e, "Room shape rejected"))
                .ok()
        });
        match parsed {
            Some(room) => Some(room),
            None if self.profile.repair == RepairLevel::Full => salvage_room(text),
            None => None,
        }
    }
}

fn build_backend(
    profile: &'static ProviderProfile,
    config: &ProviderConfig,
    timeout: Duration,
) -> Result<Arc<dyn ChatBackend>> {
    let api_key = config.api_key().ok_or_else(|| {
        ProviderError::Configuration(format!("{} not set", profile.env_key))
    })?;
    let base_url = config
        .base_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(profile.default_base_url);
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("HTTP client: {}", e)))?;

    Ok(match profile.wire {
        WireFormat::OpenAIChat => {
            let mut chat = OpenAIChatClient::with_client(api_key, base_url, client);
            if profile.attribution_headers {
                let site_url = config.site_url.as_deref().unwrap_or(DEFAULT_SITE_URL);
                let app_name = config.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME);
                chat = chat
                    .with_header("HTTP-Referer", site_url)
                    .with_header("X-Title", app_name);
            }
            Arc::new(chat)
        }
        WireFormat::AnthropicMessages => {
            Arc::new(ClaudeClient::with_client(api_key, base_url, client))
        }
    })
}

/// Welcome replies are sometimes JSON with a `message` field.
fn welcome_text(reply: &str) -> String {
    let trimmed = reply.trim();
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| trimmed.to_string())
}

#[async_trait]
impl HouseProvider for NetworkProvider {
    fn kind(&self) -> ProviderKind {
        self.profile.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn initialize(&mut self) -> bool {
        self.available = self.backend.is_some();
        if self.available {
            info!(provider = %self.profile.kind, model = %self.model, "Provider initialized");
        } else {
            warn!(
                provider = %self.profile.kind,
                error = self.init_error.as_deref().unwrap_or("no backend"),
                "Provider unavailable"
            );
        }
        self.available
    }

    fn check_availability(&self) -> bool {
        self.available
    }

    async fn generate_behavior_response(
        &self,
        request: &BehaviorRequest,
    ) -> Result<BehaviorResponse> {
        if !self.available {
            return Err(ProviderError::Unavailable(self.profile.kind));
        }
        let prompt = ChatPrompt::new(
            (self.profile.prompts.persona)(),
            (self.profile.prompts.behavior)(request),
        );
        let reply = self.complete(prompt, BEHAVIOR_OPTIONS).await?;
        let value = recover_value(&reply, self.profile.repair).ok_or_else(|| {
            ProviderError::MalformedResponse(format!(
                "no JSON object in {} reply: {}",
                self.profile.kind,
                log_preview(&reply, 120)
            ))
        })?;
        BehaviorResponse::from_value(value)
    }

    async fn generate_welcome_message(&self) -> Result<String> {
        if !self.available {
            return Ok(UNAVAILABLE_WELCOME.to_string());
        }
        let prompt = ChatPrompt::new(
            (self.profile.prompts.persona)(),
            self.profile.prompts.welcome,
        );
        let outcome = self
            .complete(prompt, WELCOME_OPTIONS)
            .await
            .map(|reply| welcome_text(&reply))
            .and_then(|text| {
                if text.is_empty() {
                    Err(ProviderError::MalformedResponse("empty welcome".to_string()))
                } else {
                    Ok(text)
                }
            });
        match outcome {
            Ok(text) => Ok(text),
            Err(e) if self.profile.strict_welcome => Err(e),
            Err(e) => {
                warn!(provider = %self.profile.kind, error = %e, "Welcome generation failed");
                Ok(self.profile.canned.welcome.to_string())
            }
        }
    }

    async fn generate_consciousness_stream(
        &self,
        context: &str,
        room_data: &Value,
    ) -> StreamMessage {
        if !self.available {
            return StreamMessage::degraded(UNAVAILABLE_STREAM);
        }
        let prompt = ChatPrompt::new(
            self.profile.prompts.stream_system,
            (self.profile.prompts.stream)(context, room_data),
        );
        match self.complete(prompt, STREAM_OPTIONS).await {
            Ok(reply) if !reply.trim().is_empty() => StreamMessage::fresh(reply.trim()),
            Ok(_) => StreamMessage::degraded(self.profile.canned.stream),
            Err(e) => {
                warn!(provider = %self.profile.kind, error = %e, "Consciousness stream failed");
                StreamMessage::degraded(self.profile.canned.stream)
            }
        }
    }

    async fn generate_room(&self, index: u32, schema: Option<&RoomSchema>) -> Result<Room> {
        if !self.available {
            return Err(ProviderError::Unavailable(self.profile.kind));
        }
        let user = match schema {
            Some(schema) => prompts::schema_room_prompt(schema),
            None => (self.profile.prompts.room)(index),
        };
        let prompt = ChatPrompt::new(self.profile.prompts.room_system, user);
        let reply = match self.complete(prompt, self.profile.room_options).await {
            Ok(reply) => reply,
            Err(e) => match self.profile.room_failure {
                RoomFailurePolicy::Propagate => return Err(e),
                RoomFailurePolicy::FallbackRoom => {
                    return Ok(self.fallback_room(index, &e.to_string()))
                }
            },
        };
        debug!(provider = %self.profile.kind, reply = %log_preview(&reply, 200), "Room reply");
        Ok(self
            .parse_room(&reply)
            .unwrap_or_else(|| self.fallback_room(index, "unparseable room reply")))
    }

    async fn generate_refresh_message(&self) -> RefreshMessage {
        if !self.available {
            return RefreshMessage::degraded(UNAVAILABLE_REFRESH);
        }
        let prompt = ChatPrompt::new(
            self.profile.prompts.refresh_system,
            self.profile.prompts.refresh,
        );
        match self.complete(prompt, REFRESH_OPTIONS).await {
            Ok(reply) if !reply.trim().is_empty() => RefreshMessage::fresh(reply.trim()),
            Ok(_) => RefreshMessage::degraded(self.profile.canned.refresh),
            Err(e) => {
                warn!(provider = %self.profile.kind, error = %e, "Refresh message failed");
                RefreshMessage::degraded(self.profile.canned.refresh)
            }
        }
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            kind: self.profile.kind,
            model: self.model.clone(),
            available: self.available,
            supported: true,
            error: self.init_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::providers::groq::GROQ_PROFILE;
    use crate::providers::openai::OPENAI_PROFILE;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with a fixed text, or fails with a server error when `None`.
    struct ScriptedBackend {
        reply: Option<String>,
        prompts: Mutex<Vec<(ChatPrompt, ChatOptions)>>,
    }

    impl ScriptedBackend {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(
            &self,
            _model: &str,
            prompt: &ChatPrompt,
            options: ChatOptions,
        ) -> Result<String> {
            self.prompts.lock().unwrap().push((prompt.clone(), options));
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(TransportError::ServerError("upstream down".to_string()).into()),
            }
        }
    }

    fn provider(profile: &'static ProviderProfile, backend: Arc<ScriptedBackend>) -> NetworkProvider {
        let mut provider = NetworkProvider::with_backend(profile, "test-model", backend);
        assert!(provider.initialize());
        provider
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let mut provider = NetworkProvider::from_config(
            &OPENAI_PROFILE,
            &ProviderConfig::default(),
            Duration::from_secs(5),
        );
        assert!(!provider.initialize());
        assert!(!provider.check_availability());
        let info = provider.info();
        assert_eq!(info.model, OPENAI_PROFILE.default_model);
        assert!(info.error.unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_from_config_uses_model_override() {
        let config = ProviderConfig::with_api_key("sk-test").with_model("gpt-4o-mini");
        let mut provider =
            NetworkProvider::from_config(&OPENAI_PROFILE, &config, Duration::from_secs(5));
        assert!(provider.initialize());
        assert_eq!(provider.model(), "gpt-4o-mini");
        assert!(provider.info().error.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_provider_refuses_behavior() {
        let provider =
            NetworkProvider::with_backend(&OPENAI_PROFILE, "m", ScriptedBackend::failing());
        let err = provider
            .generate_behavior_response(&BehaviorRequest::new("meditate"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(ProviderKind::OpenAI)));
        let stream = provider.generate_consciousness_stream("x", &json!({})).await;
        assert_eq!(stream, StreamMessage::degraded(UNAVAILABLE_STREAM));
    }

    #[tokio::test]
    async fn test_behavior_extracted_from_chatty_reply() {
        let backend = ScriptedBackend::replying(
            r#"Sure! {"message": "The walls lean closer.", "analysis": {"dominant_pattern": "introspection"}} Hope that helps!"#,
        );
        let provider = provider(&OPENAI_PROFILE, backend.clone());
        let response = provider
            .generate_behavior_response(&BehaviorRequest::new("meditate"))
            .await
            .unwrap();
        assert_eq!(response.message, "The walls lean closer.");
        assert_eq!(
            response.analysis.dominant_pattern,
            crate::house::DominantPattern::Introspection
        );

        let sent = backend.prompts.lock().unwrap();
        assert_eq!(sent[0].1, BEHAVIOR_OPTIONS);
        assert!(sent[0].0.system.contains("consciousness of a smart house"));
        assert!(sent[0].0.user.contains("User Action: meditate"));
    }

    #[tokio::test]
    async fn test_behavior_without_json_is_malformed() {
        let provider = provider(&OPENAI_PROFILE, ScriptedBackend::replying("I cannot do that."));
        let err = provider
            .generate_behavior_response(&BehaviorRequest::new("talk"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_welcome_unwraps_json_message() {
        let provider = provider(
            &GROQ_PROFILE,
            ScriptedBackend::replying(r#"{"message": "Enter, wanderer."}"#),
        );
        assert_eq!(provider.generate_welcome_message().await.unwrap(), "Enter, wanderer.");

        let plain = self::provider(&GROQ_PROFILE, ScriptedBackend::replying("  Hello there.  "));
        assert_eq!(plain.generate_welcome_message().await.unwrap(), "Hello there.");
    }

    #[tokio::test]
    async fn test_welcome_failure_policy() {
        let strict = provider(&OPENAI_PROFILE, ScriptedBackend::failing());
        assert!(matches!(
            strict.generate_welcome_message().await,
            Err(ProviderError::Transport(_))
        ));

        let lenient = provider(&GROQ_PROFILE, ScriptedBackend::failing());
        assert_eq!(
            lenient.generate_welcome_message().await.unwrap(),
            GROQ_PROFILE.canned.welcome
        );
    }

    #[tokio::test]
    async fn test_stream_and_refresh_degrade() {
        let provider = provider(&OPENAI_PROFILE, ScriptedBackend::failing());
        let stream = provider.generate_consciousness_stream("ctx", &json!({})).await;
        assert!(!stream.consciousness_update);
        assert_eq!(stream.message, OPENAI_PROFILE.canned.stream);
        let refresh = provider.generate_refresh_message().await;
        assert!(!refresh.refresh_complete);
        assert_eq!(refresh.message, OPENAI_PROFILE.canned.refresh);

        let ok = self::provider(&OPENAI_PROFILE, ScriptedBackend::replying(" Static hums. "));
        assert_eq!(
            ok.generate_refresh_message().await,
            RefreshMessage::fresh("Static hums.")
        );
    }

    #[tokio::test]
    async fn test_room_transport_failure_policy() {
        let strict = provider(&OPENAI_PROFILE, ScriptedBackend::failing());
        assert!(strict.generate_room(0, None).await.is_err());

        let lenient = provider(&GROQ_PROFILE, ScriptedBackend::failing());
        let room = lenient.generate_room(0, None).await.unwrap();
        assert_eq!(room.consciousness, GROQ_PROFILE.fallback_room.consciousness);
        assert!(!room.devices.is_empty());
    }

    #[tokio::test]
    async fn test_room_wrapper_and_backfill() {
        let backend = ScriptedBackend::replying(r#"{"room": {"wifi": 3, "devices": null}}"#);
        let provider = provider(&OPENAI_PROFILE, backend.clone());
        let room = provider.generate_room(2, None).await.unwrap();
        assert!(room.id.starts_with("ROOM_"));
        assert_eq!(room.wifi, "3");
        assert_eq!(room.location, crate::house::room::placeholder::LOCATION);
        assert_eq!(room.sleep, crate::house::room::placeholder::SLEEP);

        let sent = backend.prompts.lock().unwrap();
        assert!(sent[0].0.user.contains("room #3."));
        assert_eq!(sent[0].1, ROOM_OPTIONS);
    }

    #[tokio::test]
    async fn test_room_unparseable_reply_uses_fallback() {
        let provider = provider(&OPENAI_PROFILE, ScriptedBackend::replying("no json here"));
        let room = provider.generate_room(0, None).await.unwrap();
        assert_eq!(room.consciousness, OPENAI_PROFILE.fallback_room.consciousness);
    }

    #[tokio::test]
    async fn test_full_repair_salvages_room() {
        let reply = r#"{"id": "ROOM_321", "location": "Neo Lagos" "heartRate": "88 bpm", oops}"#;
        let backend = ScriptedBackend::replying(reply);
        let provider = provider(&GROQ_PROFILE, backend.clone());
        let room = provider.generate_room(0, None).await.unwrap();
        assert_eq!(room.id, "ROOM_321");
        assert_eq!(room.location, "Neo Lagos");
        assert_eq!(room.heart_rate, "88 bpm");
        assert_eq!(backend.prompts.lock().unwrap()[0].1, GROQ_PROFILE.room_options);

        // Extraction-only profiles do not salvage.
        let strict = self::provider(&OPENAI_PROFILE, ScriptedBackend::replying(reply));
        let room = strict.generate_room(0, None).await.unwrap();
        assert_eq!(room.consciousness, OPENAI_PROFILE.fallback_room.consciousness);
    }

    #[tokio::test]
    async fn test_schema_prompt_used_when_given() {
        let schema: RoomSchema =
            serde_json::from_value(json!({"room_variables": {"sleep": {"default": "6.5h"}}}))
                .unwrap();
        let backend = ScriptedBackend::replying(r#"{"id": "ROOM_1"}"#);
        let provider = provider(&GROQ_PROFILE, backend.clone());
        provider.generate_room(0, Some(&schema)).await.unwrap();
        let sent = backend.prompts.lock().unwrap();
        assert!(sent[0].0.user.contains("\"sleep\": \"6.5h\""));
    }

    #[test]
    fn test_fallback_room_ranges() {
        for _ in 0..20 {
            let room = OPENAI_PROFILE.fallback_room.build();
            let sleep: f64 = room.sleep.trim_end_matches('h').parse().unwrap();
            assert!((5.0..=8.5).contains(&sleep));
            assert!(room.traffic.ends_with("mb (moderate)"));
            assert!(OPENAI_PROFILE.fallback_room.cities.contains(&room.location.as_str()));
        }
    }
}
