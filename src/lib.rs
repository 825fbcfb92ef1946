//! Spec Mentor
//!
//! Guides a conversation with a hosted model toward a complete software
//! specification. Each user turn yields a mentor reply, an updated
//! specification context, and six category confidence scores that decide when
//! a specification can be generated.
//!
//! - Models (configuration, onboarding state)
//! - Storage layer (JSON config, encrypted local store)
//! - Services (prompts, extraction, mentoring session)

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::settings::{AppConfig, SettingsUpdate};
pub use models::setup::SetupState;
pub use services::{
    ContextExtractor, ExtractionFailure, ExtractionOutcome, ReplySource, SessionState, SpecMentor,
    TurnOutcome,
};
pub use storage::{ConfigService, LocalStore};
pub use utils::error::{AppError, AppResult};
