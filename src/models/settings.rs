//! Settings Models
//!
//! Application configuration stored in config.json.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use spec_mentor_llm::{ProviderConfig, ProxyConfig, DEFAULT_MODEL};

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model used for both the reply and the extraction call
    pub model: String,
    /// Messages API endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature for mentor replies
    pub reply_temperature: f32,
    /// Token budget for mentor replies
    pub reply_max_tokens: u32,
    /// Sampling temperature for context extraction
    pub extraction_temperature: f32,
    /// Token budget for context extraction
    pub extraction_max_tokens: u32,
    /// Number of most recent turns shown to the extraction call
    pub extraction_window: usize,
    /// Local store file override (defaults to ~/.spec-mentor/store.json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Outbound proxy for API calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    /// Enable debug logging
    pub debug_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            reply_temperature: 0.7,
            reply_max_tokens: 1500,
            extraction_temperature: 0.3,
            extraction_max_tokens: 1000,
            extraction_window: 6,
            store_path: None,
            proxy: None,
            debug_mode: false,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub reply_temperature: Option<f32>,
    pub reply_max_tokens: Option<u32>,
    pub extraction_temperature: Option<f32>,
    pub extraction_max_tokens: Option<u32>,
    pub extraction_window: Option<usize>,
    pub store_path: Option<PathBuf>,
    pub debug_mode: Option<bool>,
}

impl SettingsUpdate {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.base_url.is_none()
            && self.reply_temperature.is_none()
            && self.reply_max_tokens.is_none()
            && self.extraction_temperature.is_none()
            && self.extraction_max_tokens.is_none()
            && self.extraction_window.is_none()
            && self.store_path.is_none()
            && self.debug_mode.is_none()
    }
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(base_url) = update.base_url {
            self.base_url = Some(base_url).filter(|u| !u.trim().is_empty());
        }
        if let Some(temperature) = update.reply_temperature {
            self.reply_temperature = temperature;
        }
        if let Some(max_tokens) = update.reply_max_tokens {
            self.reply_max_tokens = max_tokens;
        }
        if let Some(temperature) = update.extraction_temperature {
            self.extraction_temperature = temperature;
        }
        if let Some(max_tokens) = update.extraction_max_tokens {
            self.extraction_max_tokens = max_tokens;
        }
        if let Some(window) = update.extraction_window {
            self.extraction_window = window;
        }
        if let Some(path) = update.store_path {
            self.store_path = Some(path);
        }
        if let Some(debug) = update.debug_mode {
            self.debug_mode = debug;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }

        for (name, value) in [
            ("reply_temperature", self.reply_temperature),
            ("extraction_temperature", self.extraction_temperature),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0, got {}", name, value));
            }
        }

        if self.reply_max_tokens == 0 || self.extraction_max_tokens == 0 {
            return Err("max token budgets must be greater than zero".to_string());
        }

        if self.extraction_window == 0 {
            return Err("extraction_window must be at least 1".to_string());
        }

        Ok(())
    }

    /// Provider configuration for the given API key
    pub fn provider_config(&self, api_key: Option<String>) -> ProviderConfig {
        ProviderConfig {
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.reply_max_tokens,
            temperature: self.reply_temperature,
            proxy: self.proxy.clone(),
        }
    }
}
