//! Spec Mentor Core
//!
//! Conversation records, the accumulated specification context, and the
//! deterministic confidence scoring that decides when a specification can be
//! generated. This crate performs no I/O and knows nothing about LLM providers.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `conversation` - Ordered turn log (`Conversation`, `ConversationTurn`)
//! - `context` - Specification context, partial extraction results and `merge`
//! - `rules` - Static scoring weights, bonuses and keyword vocabularies
//! - `confidence` - Category scoring and the generation gate
//! - `heuristic` - Keyword fallback extraction

pub mod confidence;
pub mod context;
pub mod conversation;
pub mod error;
pub mod heuristic;
pub mod rules;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Conversation ───────────────────────────────────────────────────────
pub use conversation::{
    recent_turns, render_transcript, Conversation, ConversationTurn, TurnRole,
};

// ── Specification Context ──────────────────────────────────────────────
pub use context::{
    merge, ListField, PartialContext, QualityField, QualityScores, ScalarField,
    SpecificationContext,
};

// ── Confidence ─────────────────────────────────────────────────────────
pub use confidence::{
    can_generate_spec, score, score_with, CategoryStatus, ConfidenceCategory, ConfidenceMetrics,
};
pub use rules::{ScoringTable, GENERATION_THRESHOLD, SCORING_TABLE};

// ── Heuristic Extraction ───────────────────────────────────────────────
pub use heuristic::keyword_fallback;
