//! Conversation Store
//!
//! Ordered, append-only record of the turns exchanged in one mentoring session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Get the string form used in prompts and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(CoreError::parse(format!("unknown turn role: {}", other))),
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    /// Unique turn ID
    pub id: String,
    /// Sender of the turn
    pub role: TurnRole,
    /// Message text
    pub text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only list of turns in creation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn. Blank messages are rejected.
    pub fn push_user(&mut self, text: impl Into<String>) -> CoreResult<&ConversationTurn> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::validation("user message must not be empty"));
        }
        Ok(self.push(TurnRole::User, text))
    }

    /// Append an assistant turn
    pub fn push_assistant(&mut self, text: impl Into<String>) -> &ConversationTurn {
        self.push(TurnRole::Assistant, text)
    }

    fn push(&mut self, role: TurnRole, text: impl Into<String>) -> &ConversationTurn {
        self.turns.push(ConversationTurn::new(role, text));
        &self.turns[self.turns.len() - 1]
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The last `n` turns (or all of them when there are fewer)
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        recent_turns(&self.turns, n)
    }

    /// Text of the most recent user turn
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::User)
            .map(|t| t.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// The last `n` of `turns` (or all of them when there are fewer)
pub fn recent_turns(turns: &[ConversationTurn], n: usize) -> &[ConversationTurn] {
    &turns[turns.len().saturating_sub(n)..]
}

/// Render turns as `role: text` blocks separated by blank lines.
pub fn render_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role, t.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
