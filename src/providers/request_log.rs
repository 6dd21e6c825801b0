//! Per-call request log entries.
//!
//! The manager emits exactly one [`RequestLogEntry`] per logical call and
//! hands it to the registered callback. Entries are never persisted here.

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::types::{GenerationRequest, ProviderKind};
use crate::utils::string::{prefix_chars, single_line};

/// Maximum length of the response preview in a log entry.
pub const RESPONSE_PREVIEW_CHARS: usize = 200;

/// Observer invoked once per logical call.
pub type LogCallback = Arc<dyn Fn(&RequestLogEntry) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    /// RFC 3339 local time
    pub timestamp: String,
    /// Provider the call was addressed to
    pub provider: ProviderKind,
    pub model: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    /// Whether the addressed provider answered
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Start of the answer actually returned to the caller
    pub response_preview: String,
    /// Provider that produced the returned answer
    pub served_by: ProviderKind,
}

impl RequestLogEntry {
    /// Entry for a call the addressed provider answered itself.
    pub fn success(
        request: &GenerationRequest<'_>,
        provider: ProviderKind,
        model: &str,
        response: &str,
    ) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            provider,
            model: model.to_string(),
            operation: request.operation().to_string(),
            args: request.args_preview(),
            success: true,
            error: None,
            response_preview: response_preview(response),
            served_by: provider,
        }
    }

    /// Entry for a call the addressed provider could not answer; the
    /// preview is of the fallback answer.
    pub fn failure(
        request: &GenerationRequest<'_>,
        provider: ProviderKind,
        model: &str,
        error: &str,
        fallback_response: &str,
        served_by: ProviderKind,
    ) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            provider,
            model: model.to_string(),
            operation: request.operation().to_string(),
            args: request.args_preview(),
            success: false,
            error: Some(error.to_string()),
            response_preview: response_preview(fallback_response),
            served_by,
        }
    }
}

fn response_preview(response: &str) -> String {
    prefix_chars(&single_line(response), RESPONSE_PREVIEW_CHARS)
}
