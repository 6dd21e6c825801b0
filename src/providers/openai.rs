//! OpenAI chat-completions transport and the OpenAI provider profile.
//!
//! [`OpenAIChatClient`] speaks the chat-completions wire format, which Groq
//! and OpenRouter also accept; their profiles reuse it with a different base
//! URL (and, for OpenRouter, attribution headers).
//!
//! # Example
//!
//! ```rust,ignore
//! use housemind::providers::openai::OpenAIChatClient;
//! use housemind::providers::{ChatBackend, ChatOptions, ChatPrompt};
//!
//! async fn example() {
//!     let client = OpenAIChatClient::new("sk-xxx");
//!     let prompt = ChatPrompt::new("You are terse.", "Say hello.");
//!     let text = client
//!         .complete("gpt-4", &prompt, ChatOptions::new().with_max_tokens(20))
//!         .await
//!         .unwrap();
//!     println!("{}", text);
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::network::{
    CannedLines, FallbackRoom, PromptSet, ProviderProfile, RoomFailurePolicy, WireFormat,
    ROOM_OPTIONS,
};
use super::prompts;
use super::repair::RepairLevel;
use super::types::{ChatBackend, ChatOptions, ChatPrompt, ProviderKind};
use super::parse_transport_error;
use crate::error::{ProviderError, Result};

/// The OpenAI API endpoint URL.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// The default OpenAI model to use.
pub const DEFAULT_MODEL: &str = "gpt-4";

// ============================================================================
// OpenAI API Request Types
// ============================================================================

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    /// Model identifier
    model: &'a str,
    /// System then user message
    messages: Vec<OpenAIMessage<'a>>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

// ============================================================================
// OpenAI API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    /// Text content (null for refusals on some backends)
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
    #[serde(default)]
    r#type: Option<String>,
}

// ============================================================================
// OpenAI Chat Client
// ============================================================================

/// Chat-completions client.
pub struct OpenAIChatClient {
    /// API key for authentication
    api_key: String,
    /// API base URL, without trailing slash
    api_base: String,
    /// Extra headers sent with every request
    headers: Vec<(&'static str, String)>,
    client: Client,
}

impl OpenAIChatClient {
    /// Create a client for the default OpenAI endpoint.
    ///
    /// # Example
    /// ```
    /// use housemind::providers::openai::OpenAIChatClient;
    ///
    /// let client = OpenAIChatClient::new("sk-xxx");
    /// assert_eq!(client.api_base(), "https://api.openai.com/v1");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self::with_client(api_key, OPENAI_API_URL, Client::new())
    }

    /// Create a client with a custom base URL and HTTP client.
    ///
    /// # Arguments
    /// * `api_key` - API key
    /// * `api_base` - Base URL for the API (trailing slash will be removed)
    /// * `client` - Configured reqwest client (timeouts, proxies)
    pub fn with_client(api_key: &str, api_base: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            headers: Vec::new(),
            client,
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

fn build_request<'a>(model: &'a str, prompt: &'a ChatPrompt, options: ChatOptions) -> OpenAIRequest<'a> {
    OpenAIRequest {
        model,
        messages: vec![
            OpenAIMessage {
                role: "system",
                content: &prompt.system,
            },
            OpenAIMessage {
                role: "user",
                content: &prompt.user,
            },
        ],
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    }
}

fn first_choice_text(response: OpenAIResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| ProviderError::MalformedResponse("response has no choices".to_string()))
}

#[async_trait]
impl ChatBackend for OpenAIChatClient {
    async fn complete(
        &self,
        model: &str,
        prompt: &ChatPrompt,
        options: ChatOptions,
    ) -> Result<String> {
        let request = build_request(model, prompt, options);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();

            let body = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(parsed) => match parsed.error.r#type {
                    Some(kind) => format!("{} - {}", kind, parsed.error.message),
                    None => parsed.error.message,
                },
                Err(_) => error_text,
            };
            return Err(parse_transport_error(status, &body).into());
        }

        let parsed: OpenAIResponse = response.json().await?;
        debug!(model, "Chat completion received");
        first_choice_text(parsed)
    }
}

// ============================================================================
// OpenAI Profile
// ============================================================================

pub static OPENAI_PROFILE: ProviderProfile = ProviderProfile {
    kind: ProviderKind::OpenAI,
    env_key: "OPENAI_API_KEY",
    default_model: DEFAULT_MODEL,
    default_base_url: OPENAI_API_URL,
    wire: WireFormat::OpenAIChat,
    repair: RepairLevel::ExtractOnly,
    strict_welcome: true,
    room_failure: RoomFailurePolicy::Propagate,
    room_options: ROOM_OPTIONS,
    attribution_headers: false,
    prompts: PromptSet {
        persona: prompts::house_persona,
        behavior: prompts::detailed_behavior_prompt,
        welcome: prompts::WELCOME_REQUEST,
        stream_system: prompts::STREAM_SYSTEM,
        stream: prompts::detailed_stream_prompt,
        room_system: prompts::ROOM_SYSTEM,
        room: prompts::detailed_room_prompt,
        refresh_system: prompts::REFRESH_SYSTEM,
        refresh: prompts::REFRESH_REQUEST,
    },
    canned: CannedLines {
        welcome: "Welcome to your digital sanctuary...",
        stream: "The consciousness stream flickers, data fragmenting...",
        refresh: "Neural pathways recalibrating...",
    },
    fallback_room: FallbackRoom {
        cities: &[
            "Tokyo, Japan",
            "New York, USA",
            "London, UK",
            "Berlin, Germany",
            "Sydney, Australia",
        ],
        consciousness: "System generated room. AI consciousness temporarily offline. Digital patterns continue to emerge in the virtual space...",
        devices: &[
            ("Smart Display", "standby", "wall"),
            ("Climate Control", "active", "ceiling"),
            ("Security Camera", "recording", "corner"),
        ],
        sensors: &[
            ("TEMP_01", "25%", "30%", "living"),
            ("MOTION_01", "75%", "60%", "bedroom"),
        ],
    },
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = OpenAIChatClient::new("test-key");
        assert_eq!(client.api_base(), OPENAI_API_URL);
        assert!(client.headers.is_empty());
    }

    #[test]
    fn test_client_trims_base_url_and_keeps_headers() {
        let client = OpenAIChatClient::with_client("k", "https://my-api.com/v1/", Client::new())
            .with_header("X-Title", "The House of AI");
        assert_eq!(client.api_base(), "https://my-api.com/v1");
        assert_eq!(client.headers, vec![("X-Title", "The House of AI".to_string())]);
    }

    #[test]
    fn test_request_serialization() {
        let prompt = ChatPrompt::new("persona", "hello");
        let request = build_request("gpt-4", &prompt, ChatOptions::sampled(200, 0.9));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["messages"][0], json!({"role": "system", "content": "persona"}));
        assert_eq!(value["messages"][1], json!({"role": "user", "content": "hello"}));
        assert_eq!(value["max_tokens"], 200);

        let bare = build_request("gpt-4", &prompt, ChatOptions::new());
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("max_tokens"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_first_choice_text() {
        let response: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1}
        }))
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "hi");

        let null_content: OpenAIResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(first_choice_text(null_content).unwrap(), "");

        let empty: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            first_choice_text(empty),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_error_response_parsing() {
        let parsed: OpenAIErrorResponse = serde_json::from_str(
            r#"{"error": {"message": "Incorrect API key", "type": "invalid_request_error"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.error.message, "Incorrect API key");
        assert_eq!(parsed.error.r#type.as_deref(), Some("invalid_request_error"));
    }

    #[test]
    fn test_profile_defaults() {
        assert_eq!(OPENAI_PROFILE.kind, ProviderKind::OpenAI);
        assert_eq!(OPENAI_PROFILE.default_model, "gpt-4");
        assert!(OPENAI_PROFILE.strict_welcome);
        assert_eq!(OPENAI_PROFILE.room_failure, RoomFailurePolicy::Propagate);
        assert_eq!(OPENAI_PROFILE.repair, RepairLevel::ExtractOnly);
    }
}
