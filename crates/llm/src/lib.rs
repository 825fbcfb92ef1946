//! Spec Mentor LLM
//!
//! Provider abstraction used by the mentoring services, with the Anthropic
//! Messages API as the concrete implementation. Also includes the proxy
//! configuration types and the HTTP client factory.

pub mod anthropic;
pub mod http_client;
pub mod provider;
pub mod proxy;
pub mod types;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use http_client::build_http_client;
pub use provider::{missing_api_key_error, parse_http_error, LlmProvider};
pub use proxy::{ProxyConfig, ProxyProtocol};
pub use types::*;
