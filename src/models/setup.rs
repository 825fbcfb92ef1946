//! Setup State Models
//!
//! Onboarding progress and user preferences persisted in the local store.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Local store key for [`SetupState`]
pub const SETUP_STATE_KEY: &str = "appState";

/// Completed onboarding steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetupProgress {
    pub welcome: bool,
    pub tools_installation: bool,
    pub api_configuration: bool,
    pub verification: bool,
    pub completed: bool,
}

/// Developer tools tracked by onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tool {
    Cursor,
    ClaudeCode,
    Git,
    Github,
}

/// Developer tools the user has confirmed as installed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolInstallation {
    pub cursor: bool,
    pub claude_code: bool,
    pub git: bool,
    pub github: bool,
}

impl ToolInstallation {
    fn flag_mut(&mut self, tool: Tool) -> &mut bool {
        match tool {
            Tool::Cursor => &mut self.cursor,
            Tool::ClaudeCode => &mut self.claude_code,
            Tool::Git => &mut self.git,
            Tool::Github => &mut self.github,
        }
    }

    pub fn all_installed(&self) -> bool {
        self.cursor && self.claude_code && self.git && self.github
    }
}

/// Outcome of the last credential check. The key itself is stored separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfiguration {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_validated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[default]
    #[serde(rename = "en-GB")]
    #[value(name = "en-GB")]
    EnGb,
    #[serde(rename = "en-US")]
    #[value(name = "en-US")]
    EnUs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub language: Language,
    pub theme: Theme,
}

/// Everything the onboarding flow remembers between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetupState {
    pub setup_progress: SetupProgress,
    pub tools_installation: ToolInstallation,
    pub api_configuration: ApiConfiguration,
    pub preferences: UserPreferences,
}

impl SetupState {
    pub fn mark_welcome_seen(&mut self) {
        self.setup_progress.welcome = true;
    }

    /// Record one tool's status; the tools step completes once all are installed
    pub fn set_tool_installed(&mut self, tool: Tool, installed: bool) {
        *self.tools_installation.flag_mut(tool) = installed;
        self.setup_progress.tools_installation = self.tools_installation.all_installed();
    }

    /// Record the result of a credential check.
    ///
    /// A successful check finishes verification and onboarding; a failed one
    /// reopens both.
    pub fn record_validation(&mut self, is_valid: bool, at: DateTime<Utc>) {
        self.api_configuration.is_valid = is_valid;
        self.api_configuration.last_validated = Some(at);
        self.setup_progress.api_configuration = is_valid;
        self.setup_progress.verification = is_valid;
        self.setup_progress.completed = is_valid;
    }

    /// Whether onboarding finished with a verified API key
    pub fn is_ready(&self) -> bool {
        self.setup_progress.completed && self.api_configuration.is_valid
    }

    /// Onboarding steps still open, in onboarding order
    pub fn pending_steps(&self) -> Vec<&'static str> {
        let progress = &self.setup_progress;
        [
            ("welcome", progress.welcome),
            ("tools installation", progress.tools_installation),
            ("API configuration", progress.api_configuration),
            ("verification", progress.verification),
        ]
        .into_iter()
        .filter(|(_, done)| !done)
        .map(|(step, _)| step)
        .collect()
    }
}
