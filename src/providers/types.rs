//! Provider protocol and shared request types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::house::{
    BehaviorRequest, BehaviorResponse, RefreshMessage, Room, RoomSchema, StreamMessage,
};
use crate::utils::string::{prefix_chars, single_line};

/// Maximum length of the argument preview in a request log entry.
pub const ARGS_PREVIEW_CHARS: usize = 500;

// ============================================================================
// Provider Kind
// ============================================================================

/// Closed set of provider backends.
///
/// Serialized as `openai`, `anthropic`, `groq`, `openrouter`, `rule_based`;
/// parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ProviderKind {
    /// OpenAI chat-completions
    #[serde(rename = "openai")]
    OpenAI,
    /// Anthropic messages
    #[serde(rename = "anthropic")]
    Anthropic,
    /// Groq (fast inference, OpenAI-compatible wire format)
    #[serde(rename = "groq")]
    Groq,
    /// OpenRouter aggregator (OpenAI-compatible wire format)
    #[serde(rename = "openrouter")]
    OpenRouter,
    /// Local, network-free fallback
    #[serde(rename = "rule_based")]
    RuleBased,
}

impl ProviderKind {
    /// Auto-selection order: general-purpose backends first, then the fast
    /// backend, then the aggregator, with the local fallback last.
    pub const PRIORITY: [ProviderKind; 5] = [
        ProviderKind::OpenAI,
        ProviderKind::Anthropic,
        ProviderKind::Groq,
        ProviderKind::OpenRouter,
        ProviderKind::RuleBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Groq => "groq",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::RuleBased => "rule_based",
        }
    }

    /// Whether this kind talks to a remote backend.
    pub fn is_network(&self) -> bool {
        !matches!(self, ProviderKind::RuleBased)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "groq" => Ok(ProviderKind::Groq),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "rule_based" | "rulebased" => Ok(ProviderKind::RuleBased),
            _ => Err(ProviderError::Configuration(format!(
                "unknown provider kind '{}'",
                s.trim()
            ))),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = ProviderError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// ============================================================================
// Provider Protocol
// ============================================================================

/// The contract every backend satisfies.
///
/// Stream and refresh generation are infallible by type: a provider that
/// cannot reach its backend answers with a canned line instead.
#[async_trait]
pub trait HouseProvider: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> ProviderKind;

    /// Model identifier in use.
    fn model(&self) -> &str;

    /// Run credential and client checks and record availability.
    ///
    /// Called once after construction. Never errors; an unavailable provider
    /// stays unavailable for its lifetime.
    fn initialize(&mut self) -> bool;

    /// The availability recorded by [`HouseProvider::initialize`].
    fn check_availability(&self) -> bool;

    /// Analyse one user action.
    async fn generate_behavior_response(
        &self,
        request: &BehaviorRequest,
    ) -> Result<BehaviorResponse>;

    /// A short greeting for a new visitor.
    async fn generate_welcome_message(&self) -> Result<String>;

    /// A consciousness passage for a room.
    async fn generate_consciousness_stream(&self, context: &str, room_data: &Value)
        -> StreamMessage;

    /// A complete hotel room. `index` is zero-based.
    async fn generate_room(&self, index: u32, schema: Option<&RoomSchema>) -> Result<Room>;

    /// A hotel-network refresh notice.
    async fn generate_refresh_message(&self) -> RefreshMessage;

    /// Diagnostics snapshot. Never includes credentials.
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            kind: self.kind(),
            model: self.model().to_string(),
            available: self.check_availability(),
            supported: true,
            error: None,
        }
    }
}

/// Diagnostics view of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub kind: ProviderKind,
    pub model: String,
    pub available: bool,
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Chat Transport
// ============================================================================

/// Sampling options for one backend round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChatOptions {
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    pub temperature: Option<f32>,
}

impl ChatOptions {
    /// Create new default chat options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with both a token bound and a temperature. Usable in consts.
    pub const fn sampled(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        }
    }

    /// Set the maximum number of tokens to generate.
    ///
    /// # Example
    /// ```
    /// use housemind::providers::ChatOptions;
    ///
    /// let options = ChatOptions::new().with_max_tokens(200);
    /// assert_eq!(options.max_tokens, Some(200));
    /// ```
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    ///
    /// # Example
    /// ```
    /// use housemind::providers::ChatOptions;
    ///
    /// let options = ChatOptions::new().with_temperature(0.7);
    /// assert_eq!(options.temperature, Some(0.7));
    /// ```
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A role-structured prompt: system persona plus user payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// One backend wire format (chat-completions, messages, ...).
///
/// Implementations return the raw text of the first completion.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, model: &str, prompt: &ChatPrompt, options: ChatOptions)
        -> Result<String>;
}

// ============================================================================
// Generation Requests
// ============================================================================

/// One logical call, as seen by logging.
#[derive(Debug, Clone, Copy)]
pub enum GenerationRequest<'a> {
    Behavior(&'a BehaviorRequest),
    Welcome,
    ConsciousnessStream { context: &'a str, room_data: &'a Value },
    Room { index: u32, schema: Option<&'a RoomSchema> },
    Refresh,
}

impl GenerationRequest<'_> {
    /// Operation name used in logs.
    pub fn operation(&self) -> &'static str {
        match self {
            GenerationRequest::Behavior(_) => "generate_behavior_response",
            GenerationRequest::Welcome => "generate_welcome_message",
            GenerationRequest::ConsciousnessStream { .. } => "generate_consciousness_stream",
            GenerationRequest::Room { .. } => "generate_room",
            GenerationRequest::Refresh => "generate_refresh_message",
        }
    }

    /// Single-line argument preview, at most [`ARGS_PREVIEW_CHARS`] chars.
    /// `None` for operations without arguments.
    pub fn args_preview(&self) -> Option<String> {
        let rendered = match self {
            GenerationRequest::Behavior(request) => serde_json::to_string(request).ok()?,
            GenerationRequest::ConsciousnessStream { context, room_data } => {
                format!("context={} room_data={}", context, room_data)
            }
            GenerationRequest::Room { index, schema } => format!(
                "index={} schema={}",
                index,
                if schema.is_some() { "provided" } else { "none" }
            ),
            GenerationRequest::Welcome | GenerationRequest::Refresh => return None,
        };
        Some(prefix_chars(&single_line(&rendered), ARGS_PREVIEW_CHARS))
    }
}
