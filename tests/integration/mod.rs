//! Integration Tests Module
//!
//! End-to-end tests for Spec Mentor: full mentoring turns against a mock
//! provider, extraction fallbacks, the HTTP provider behind a mock server,
//! the encrypted local store, and API key onboarding.

// Shared mock provider
mod mock_provider;

// Mentoring session turns (reply, extraction, merge, scoring)
mod mentor_session_test;


// Anthropic provider against a mock HTTP server
mod anthropic_http_test;

// Local store and persisted setup state
mod local_store_test;

// API key registration and setup progress
mod onboarding_test;
