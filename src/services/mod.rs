//! Services
//!
//! Prompt templates, context extraction, the mentoring session loop and
//! API key onboarding.

pub mod extraction;
pub mod mentor;
pub mod onboarding;
pub mod prompt;

pub use extraction::{ContextExtractor, ExtractionFailure, ExtractionOutcome};
pub use mentor::{ReplySource, SessionState, SpecMentor, TurnOutcome};
