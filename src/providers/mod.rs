//! Providers module - house AI backends (OpenAI, Anthropic, Groq, OpenRouter)
//!
//! Every backend implements [`HouseProvider`], a uniform contract for the
//! five generation operations. Network providers share one algorithm
//! ([`network::NetworkProvider`]) and differ only in their
//! [`network::ProviderProfile`]; the [`rule_based::RuleBasedProvider`] needs
//! no network and is the fallback of last resort. The
//! [`manager::ProviderManager`] ties them together.
//!
//! # Example
//!
//! ```rust,ignore
//! use housemind::config::Config;
//! use housemind::house::BehaviorRequest;
//! use housemind::providers::{ProviderFactory, ProviderManager};
//!
//! async fn example() {
//!     let manager = ProviderManager::new(ProviderFactory::new(Config::load().unwrap()));
//!     let response = manager
//!         .generate_behavior_response(&BehaviorRequest::new("meditate"))
//!         .await;
//!     println!("{}", response.message);
//! }
//! ```

pub mod claude;
pub mod factory;
pub mod groq;
pub mod manager;
pub mod network;
pub mod openai;
pub mod openrouter;
mod prompts;
pub mod repair;
pub mod request_log;
pub mod rule_based;
mod types;

use crate::error::TransportError;

pub use factory::{config_from_environment, ProviderFactory, ProviderSpec, PROVIDER_REGISTRY};
pub use manager::ProviderManager;
pub use network::{NetworkProvider, ProviderProfile};
pub use request_log::{LogCallback, RequestLogEntry};
pub use rule_based::RuleBasedProvider;
pub use types::{
    ChatBackend, ChatOptions, ChatPrompt, GenerationRequest, HouseProvider, ProviderInfo,
    ProviderKind, ARGS_PREVIEW_CHARS,
};

/// Parse an HTTP status code and response body into a structured [`TransportError`].
///
/// This centralizes the mapping from HTTP status codes to error classifications
/// so that both wire formats produce consistent typed errors.
pub fn parse_transport_error(status: u16, body: &str) -> TransportError {
    match status {
        401 => TransportError::Auth(body.to_string()),
        402 => TransportError::Billing(body.to_string()),
        404 => TransportError::ModelNotFound(body.to_string()),
        429 => TransportError::RateLimit(body.to_string()),
        400 => TransportError::InvalidRequest(body.to_string()),
        500..=599 => TransportError::ServerError(body.to_string()),
        _ => TransportError::Unknown(format!("HTTP {}: {}", status, body)),
    }
}
