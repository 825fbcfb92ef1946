//! Mentoring Session
//!
//! Threads explicit session state through one turn:
//! user turn -> reply (or canned fallback) -> extraction -> merge -> score.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use spec_mentor_core::{
    merge, score, ConfidenceMetrics, Conversation, ConversationTurn, SpecificationContext, TurnRole,
};
use spec_mentor_llm::{LlmError, LlmProvider, LlmRequestOptions, Message};

use crate::models::settings::AppConfig;
use crate::services::extraction::{ContextExtractor, ExtractionOutcome};
use crate::services::prompt::{
    build_reply_system_prompt, generic_fallback_reply, AUTH_FAILURE_REPLY, EMPTY_REPLY_MESSAGE,
    MISSING_CREDENTIALS_MESSAGE, RATE_LIMIT_REPLY, WELCOME_MESSAGE,
};
use crate::utils::error::AppResult;

/// Everything one mentoring session accumulates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub conversation: Conversation,
    pub context: SpecificationContext,
    pub confidence: ConfidenceMetrics,
}

impl SessionState {
    /// A fresh session that opens with the welcome message
    pub fn new() -> Self {
        let mut conversation = Conversation::new();
        conversation.push_assistant(WELCOME_MESSAGE);
        Self {
            conversation,
            context: SpecificationContext::new(),
            confidence: ConfidenceMetrics::default(),
        }
    }

    pub fn overall(&self) -> u8 {
        self.confidence.overall()
    }

    pub fn can_generate_spec(&self) -> bool {
        self.confidence.can_generate_spec()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the assistant turn came from
#[derive(Debug, Clone, PartialEq)]
pub enum ReplySource {
    /// The model answered
    Model,
    /// The reply call failed and a canned reply was used
    Fallback(LlmError),
    /// No provider is configured
    MissingCredentials,
}

/// Result of one user turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub reply_source: ReplySource,
    /// `None` when no extraction ran (reply failed or no credentials)
    pub extraction: Option<ExtractionOutcome>,
    pub confidence: ConfidenceMetrics,
    pub overall: u8,
    pub can_generate_spec: bool,
}

/// Drives a mentoring conversation against an optional provider
pub struct SpecMentor {
    provider: Option<Arc<dyn LlmProvider>>,
    extractor: ContextExtractor,
    reply_options: LlmRequestOptions,
}

impl SpecMentor {
    /// Create a mentor with the default call parameters
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self::from_config(&AppConfig::default(), provider)
    }

    /// Create a mentor using the call parameters from `config`
    pub fn from_config(config: &AppConfig, provider: Option<Arc<dyn LlmProvider>>) -> Self {
        let extractor = ContextExtractor::new(provider.clone())
            .with_window(config.extraction_window)
            .with_options(LlmRequestOptions::new(
                config.extraction_temperature,
                config.extraction_max_tokens,
            ));
        Self {
            provider,
            extractor,
            reply_options: LlmRequestOptions::new(config.reply_temperature, config.reply_max_tokens),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Process one user message.
    ///
    /// Fails only when the message is blank; provider problems are turned into
    /// canned replies.
    pub async fn send(&self, session: &mut SessionState, text: &str) -> AppResult<TurnOutcome> {
        session.conversation.push_user(text)?;

        let Some(provider) = self.provider.as_ref() else {
            warn!("No LLM provider configured");
            session.conversation.push_assistant(MISSING_CREDENTIALS_MESSAGE);
            return Ok(finish_turn(
                session,
                MISSING_CREDENTIALS_MESSAGE.to_string(),
                ReplySource::MissingCredentials,
                None,
            ));
        };

        let messages = build_api_messages(session.conversation.turns());
        let system = build_reply_system_prompt(&session.context);
        debug!(messages = messages.len(), "Requesting mentor reply");

        let reply = match provider
            .send_message(messages, Some(system), self.reply_options)
            .await
        {
            Ok(response) => response
                .text()
                .map(str::to_string)
                .unwrap_or_else(|| EMPTY_REPLY_MESSAGE.to_string()),
            Err(error) => {
                warn!(error = %error, "Mentor reply failed, using fallback reply");
                let last_user = session.conversation.last_user_text().unwrap_or_default();
                let reply = fallback_reply(&error, last_user);
                session.conversation.push_assistant(reply.clone());
                return Ok(finish_turn(session, reply, ReplySource::Fallback(error), None));
            }
        };

        session.conversation.push_assistant(reply.clone());

        let extraction = self
            .extractor
            .extract(session.conversation.turns(), &session.context)
            .await;
        let depth = u32::try_from(session.conversation.len()).unwrap_or(u32::MAX);
        session.context = merge(&session.context, extraction.partial(), depth, Utc::now());

        Ok(finish_turn(session, reply, ReplySource::Model, Some(extraction)))
    }

    /// Check the configured credentials with a minimal request
    pub async fn verify_credentials(&self) -> bool {
        match &self.provider {
            Some(provider) => match provider.health_check().await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Credential check failed");
                    false
                }
            },
            None => false,
        }
    }
}

fn finish_turn(
    session: &mut SessionState,
    reply: String,
    reply_source: ReplySource,
    extraction: Option<ExtractionOutcome>,
) -> TurnOutcome {
    session.confidence = score(&session.context);
    let overall = session.confidence.overall();
    let can_generate_spec = session.confidence.can_generate_spec();

    info!(
        turns = session.conversation.len(),
        overall,
        ready = can_generate_spec,
        fallback_extraction = extraction.as_ref().is_some_and(ExtractionOutcome::is_fallback),
        "Turn processed"
    );

    TurnOutcome {
        reply,
        reply_source,
        extraction,
        confidence: session.confidence,
        overall,
        can_generate_spec,
    }
}

/// Convert turns to API messages. The API requires the first message to come
/// from the user, so leading assistant turns are skipped.
pub fn build_api_messages(turns: &[ConversationTurn]) -> Vec<Message> {
    turns
        .iter()
        .skip_while(|t| t.role == TurnRole::Assistant)
        .map(|t| match t.role {
            TurnRole::User => Message::user(t.text.clone()),
            TurnRole::Assistant => Message::assistant(t.text.clone()),
        })
        .collect()
}

/// Choose a canned reply for a failed reply call.
///
/// Typed rate-limit and auth errors decide directly. Only errors that carry an
/// unclassified provider message (network, server, other) are searched for
/// rate-limit or auth hints; request and parse errors get the generic reply.
pub fn fallback_reply(error: &LlmError, last_user_text: &str) -> String {
    let hint = match error {
        LlmError::RateLimited { .. } => return RATE_LIMIT_REPLY.to_string(),
        LlmError::AuthenticationFailed { .. } => return AUTH_FAILURE_REPLY.to_string(),
        LlmError::NetworkError { message }
        | LlmError::ServerError { message, .. }
        | LlmError::Other { message } => Some(message.as_str()),
        LlmError::InvalidRequest { .. }
        | LlmError::ModelNotFound { .. }
        | LlmError::ParseError { .. } => None,
    };

    if let Some(message) = hint {
        if message.contains("rate limit") || message.contains("429") {
            return RATE_LIMIT_REPLY.to_string();
        }
        if message.contains("invalid") || message.contains("401") {
            return AUTH_FAILURE_REPLY.to_string();
        }
    }

    generic_fallback_reply(last_user_text)
}
