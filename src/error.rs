//! Error types for HouseMind
//!
//! This module defines the closed error type shared by every provider.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.
//!
//! The manager never needs to distinguish failure causes to do the right
//! thing, but logs and the CLI do, so transport failures keep their HTTP
//! classification.

use std::fmt;
use thiserror::Error;

use crate::providers::ProviderKind;

// ============================================================================
// Transport Error Classification
// ============================================================================

/// Structured classification of a failed backend round-trip.
///
/// Built from the HTTP status code of a non-2xx response, or from the
/// underlying client error when no response arrived at all.
#[derive(Debug)]
pub enum TransportError {
    /// 401: Invalid API key or authentication failure
    Auth(String),
    /// 429: Rate limit or quota exceeded
    RateLimit(String),
    /// 402: Payment required or billing issue
    Billing(String),
    /// 500/502/503/504: Server-side errors
    ServerError(String),
    /// 400: Bad request, invalid JSON, malformed parameters
    InvalidRequest(String),
    /// 404: Model not found or endpoint not available
    ModelNotFound(String),
    /// Connection or read timeout
    Timeout(String),
    /// Connection refused, DNS failure, TLS failure
    Connection(String),
    /// Catch-all for unrecognized errors
    Unknown(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            TransportError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            TransportError::Billing(msg) => write!(f, "Billing error: {}", msg),
            TransportError::ServerError(msg) => write!(f, "Server error: {}", msg),
            TransportError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            TransportError::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            TransportError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            TransportError::Connection(msg) => write!(f, "Connection error: {}", msg),
            TransportError::Unknown(msg) => write!(f, "Unknown transport error: {}", msg),
        }
    }
}

impl TransportError {
    /// Returns the HTTP status code associated with this error, if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Auth(_) => Some(401),
            TransportError::RateLimit(_) => Some(429),
            TransportError::Billing(_) => Some(402),
            TransportError::ServerError(_) => Some(500),
            TransportError::InvalidRequest(_) => Some(400),
            TransportError::ModelNotFound(_) => Some(404),
            TransportError::Timeout(_) => None,
            TransportError::Connection(_) => None,
            TransportError::Unknown(_) => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            crate::providers::parse_transport_error(status.as_u16(), &err.to_string())
        } else {
            TransportError::Unknown(err.to_string())
        }
    }
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        ProviderError::Transport(err)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(TransportError::from(err))
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The closed error type for every provider operation.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Missing credentials, unregistered provider kind, unreadable config.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider failed initialization and cannot serve requests.
    #[error("Provider not available: {0}")]
    Unavailable(ProviderKind),

    /// The backend round-trip failed (network, timeout, auth, quota).
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// The backend answered, but nothing usable survived the repair pipeline.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for HouseMind operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
