//! LLM Provider Trait
//!
//! Defines the interface the mentoring services talk to.

use async_trait::async_trait;

use crate::types::{LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig};

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Send a message and get a complete response.
    ///
    /// # Arguments
    /// * `messages` - Conversation history, starting with a user message
    /// * `system` - Optional system prompt
    /// * `request_options` - Per-call temperature and token overrides
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse>;

    /// Check that the provider is reachable and the API key is accepted.
    async fn health_check(&self) -> LlmResult<()>;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Map a non-2xx response to an error.
///
/// Anthropic error bodies look like `{"error": {"type": ..., "message": ...}}`;
/// when the body has that shape only the message is kept.
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    let detail = error_body_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key ({})", provider, detail),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied ({})", provider, detail),
        },
        404 => LlmError::ModelNotFound { model: detail },
        429 => LlmError::RateLimited {
            message: detail,
            retry_after: None,
        },
        400 => LlmError::InvalidRequest { message: detail },
        500..=599 => LlmError::ServerError {
            message: detail,
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, detail),
        },
    }
}

fn error_body_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
