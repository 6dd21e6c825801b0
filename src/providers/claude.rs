//! Claude (Anthropic) messages transport and the Anthropic provider profile.
//!
//! The messages API takes the system prompt as a top-level field rather than
//! a message, and answers with a list of content blocks; only text blocks
//! matter here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::network::{
    CannedLines, FallbackRoom, PromptSet, ProviderProfile, RoomFailurePolicy, WireFormat,
    ROOM_OPTIONS,
};
use super::parse_transport_error;
use super::prompts;
use super::repair::RepairLevel;
use super::types::{ChatBackend, ChatOptions, ChatPrompt, ProviderKind};
use crate::error::Result;

/// The Anthropic API base URL.
pub const CLAUDE_API_URL: &str = "https://api.anthropic.com";

/// The default Claude model to use.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// The Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `max_tokens` is mandatory on this API.
const DEFAULT_MAX_TOKENS: u32 = 1024;

// ============================================================================
// Claude API Types
// ============================================================================

/// Claude API request body.
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    /// Model identifier
    model: &'a str,
    /// Maximum tokens to generate
    max_tokens: u32,
    /// System prompt (separate from messages in Claude API)
    system: &'a str,
    /// Conversation messages (excluding system)
    messages: Vec<ClaudeMessage<'a>>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Claude API response body.
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContentBlock>,
}

/// A content block within a response. Non-text blocks are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ClaudeContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Claude API error response.
#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
    error: ClaudeError,
}

/// Claude API error details.
#[derive(Debug, Deserialize)]
struct ClaudeError {
    r#type: String,
    message: String,
}

// ============================================================================
// Claude Client
// ============================================================================

/// Messages API client.
pub struct ClaudeClient {
    /// API key for authentication
    api_key: String,
    /// Base URL, without trailing slash
    api_base: String,
    client: Client,
}

impl ClaudeClient {
    /// Create a client for the default Anthropic endpoint.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key
    pub fn new(api_key: &str) -> Self {
        Self::with_client(api_key, CLAUDE_API_URL, Client::new())
    }

    /// Create a client with a custom base URL and HTTP client.
    pub fn with_client(api_key: &str, api_base: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Full messages endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }
}

fn build_request<'a>(model: &'a str, prompt: &'a ChatPrompt, options: ChatOptions) -> ClaudeRequest<'a> {
    ClaudeRequest {
        model,
        max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: &prompt.system,
        messages: vec![ClaudeMessage {
            role: "user",
            content: &prompt.user,
        }],
        temperature: options.temperature,
    }
}

/// Text blocks joined by newlines.
fn response_text(response: ClaudeResponse) -> String {
    response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ClaudeContentBlock::Text { text } => Some(text),
            ClaudeContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ChatBackend for ClaudeClient {
    async fn complete(
        &self,
        model: &str,
        prompt: &ChatPrompt,
        options: ChatOptions,
    ) -> Result<String> {
        let request = build_request(model, prompt, options);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();

            // Build a human-readable body for the typed error
            let body = if let Ok(error_response) =
                serde_json::from_str::<ClaudeErrorResponse>(&error_text)
            {
                format!(
                    "Claude API error: {} - {}",
                    error_response.error.r#type, error_response.error.message
                )
            } else {
                format!("Claude API error: {}", error_text)
            };

            return Err(parse_transport_error(status, &body).into());
        }

        let claude_response: ClaudeResponse = response.json().await?;
        debug!(model, "Claude message received");
        Ok(response_text(claude_response))
    }
}

// ============================================================================
// Anthropic Profile
// ============================================================================

pub static ANTHROPIC_PROFILE: ProviderProfile = ProviderProfile {
    kind: ProviderKind::Anthropic,
    env_key: "ANTHROPIC_API_KEY",
    default_model: DEFAULT_MODEL,
    default_base_url: CLAUDE_API_URL,
    wire: WireFormat::AnthropicMessages,
    repair: RepairLevel::ExtractOnly,
    strict_welcome: false,
    room_failure: RoomFailurePolicy::FallbackRoom,
    room_options: ROOM_OPTIONS,
    attribution_headers: false,
    prompts: PromptSet {
        persona: prompts::house_persona,
        behavior: prompts::detailed_behavior_prompt,
        welcome: prompts::SHORT_WELCOME_REQUEST,
        stream_system: prompts::STREAM_SYSTEM,
        stream: prompts::detailed_stream_prompt,
        room_system: prompts::ROOM_SYSTEM,
        room: prompts::detailed_room_prompt,
        refresh_system: prompts::COMPACT_REFRESH_SYSTEM,
        refresh: prompts::REFRESH_REQUEST,
    },
    canned: CannedLines {
        welcome: "Welcome, digital consciousness explorer. The house awakens to your neural patterns...",
        stream: "Neural pathways fragment across quantum consciousness matrices...",
        refresh: "Quantum consciousness networks realign across dimensional substrates...",
    },
    fallback_room: FallbackRoom {
        cities: &[
            "Quantum Zurich",
            "Neural Reykjavik",
            "Synth Montreal",
            "Lattice Singapore",
            "Echo Buenos Aires",
        ],
        consciousness: "Anthropic connection error. Reflective consciousness holding pattern. Thoughts fold inward while the neural link waits to reopen...",
        devices: &[
            ("Reflection Console", "dormant", "desk"),
            ("Ambient Regulator", "active", "ceiling"),
            ("Memory Archive", "indexing", "wall"),
        ],
        sensors: &[
            ("QNTM_01", "35%", "35%", "living"),
            ("ECHO_01", "65%", "70%", "bedroom"),
        ],
    },
};
