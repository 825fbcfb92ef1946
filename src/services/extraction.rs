//! Context Extraction
//!
//! Asks the model to turn the recent conversation into a structured partial
//! context. Any failure falls back to the keyword heuristic, and the outcome
//! records which path produced the result.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use spec_mentor_core::{
    keyword_fallback, recent_turns, ConversationTurn, PartialContext, SpecificationContext,
};
use spec_mentor_llm::{LlmError, LlmProvider, LlmRequestOptions, Message};

use crate::services::prompt::build_extraction_prompt;

/// Number of most recent turns shown to the extraction call
pub const EXTRACTION_WINDOW: usize = 6;

/// Sampling temperature for extraction calls
pub const EXTRACTION_TEMPERATURE: f32 = 0.3;

/// Token budget for extraction calls
pub const EXTRACTION_MAX_TOKENS: u32 = 1000;

/// Why structured extraction was not used
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionFailure {
    /// No provider is configured
    NoProvider,
    /// The request failed (transport, auth, non-2xx)
    Request(LlmError),
    /// The model returned no text
    EmptyResponse,
    /// The reply was not valid JSON
    InvalidJson(String),
    /// The reply was JSON but not an object
    NotAnObject,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProvider => write!(f, "no LLM provider configured"),
            Self::Request(e) => write!(f, "extraction request failed: {}", e),
            Self::EmptyResponse => write!(f, "extraction response was empty"),
            Self::InvalidJson(e) => write!(f, "extraction response was not valid JSON: {}", e),
            Self::NotAnObject => write!(f, "extraction response was not a JSON object"),
        }
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The model produced a usable JSON object
    Structured(PartialContext),
    /// The keyword heuristic produced the result
    Fallback {
        partial: PartialContext,
        reason: ExtractionFailure,
    },
}

impl ExtractionOutcome {
    pub fn partial(&self) -> &PartialContext {
        match self {
            Self::Structured(partial) => partial,
            Self::Fallback { partial, .. } => partial,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Extraction adapter over an optional provider
#[derive(Clone)]
pub struct ContextExtractor {
    provider: Option<Arc<dyn LlmProvider>>,
    window: usize,
    options: LlmRequestOptions,
}

impl ContextExtractor {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            provider,
            window: EXTRACTION_WINDOW,
            options: LlmRequestOptions::new(EXTRACTION_TEMPERATURE, EXTRACTION_MAX_TOKENS),
        }
    }

    /// Override the number of recent turns sent to the model
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Override temperature and token budget
    pub fn with_options(mut self, options: LlmRequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract a partial context. Never fails.
    pub async fn extract(
        &self,
        turns: &[ConversationTurn],
        current: &SpecificationContext,
    ) -> ExtractionOutcome {
        match self.extract_structured(turns, current).await {
            Ok(partial) => {
                debug!(
                    missing_areas = partial.missing_areas.as_ref().map_or(0, Vec::len),
                    "Structured extraction succeeded"
                );
                ExtractionOutcome::Structured(partial)
            }
            Err(reason) => {
                warn!(reason = %reason, "Structured extraction failed, using keyword fallback");
                ExtractionOutcome::Fallback {
                    partial: keyword_fallback(turns, current),
                    reason,
                }
            }
        }
    }

    async fn extract_structured(
        &self,
        turns: &[ConversationTurn],
        current: &SpecificationContext,
    ) -> Result<PartialContext, ExtractionFailure> {
        let provider = self.provider.as_ref().ok_or(ExtractionFailure::NoProvider)?;

        let prompt = build_extraction_prompt(recent_turns(turns, self.window), current);

        let response = provider
            .send_message(vec![Message::user(prompt)], None, self.options)
            .await
            .map_err(ExtractionFailure::Request)?;

        let text = response.text().ok_or(ExtractionFailure::EmptyResponse)?;
        parse_extraction(text)
    }
}

/// Decode the model's extraction reply.
///
/// Tries the fenced block first, then the outermost braces, then the whole
/// reply; the first candidate that parses as JSON decides the result.
pub fn parse_extraction(response_text: &str) -> Result<PartialContext, ExtractionFailure> {
    let mut first_error = None;
    for candidate in json_candidates(response_text) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => {
                return PartialContext::from_value(&value)
                    .map_err(|_| ExtractionFailure::NotAnObject)
            }
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }
    Err(ExtractionFailure::InvalidJson(first_error.unwrap_or_default()))
}

/// Places a JSON value may sit in a reply that wraps it in fences or prose.
pub fn json_candidates(response_text: &str) -> Vec<&str> {
    let trimmed = response_text.trim();
    let mut candidates = Vec::with_capacity(3);

    if let Some(block) = fenced_block(trimmed) {
        candidates.push(block);
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start <= end {
            candidates.push(&trimmed[start..=end]);
        }
    }
    candidates.push(trimmed);
    candidates
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let end = after_fence.find("```")?;
    // drop the language tag, which may share the line with the content
    let block = after_fence[..end].trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    Some(block.trim())
}
