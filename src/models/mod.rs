//! Data Models
//!
//! Persisted configuration and onboarding state.

pub mod settings;
pub mod setup;

pub use settings::{AppConfig, SettingsUpdate};
pub use setup::{
    ApiConfiguration, Language, SetupProgress, SetupState, Theme, Tool, ToolInstallation,
    UserPreferences, SETUP_STATE_KEY,
};
