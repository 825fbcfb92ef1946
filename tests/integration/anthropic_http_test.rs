//! Anthropic Provider HTTP Integration Tests
//!
//! Runs full mentoring turns against a mock Messages API endpoint.

use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;

use spec_mentor::services::prompt::AUTH_FAILURE_REPLY;
use spec_mentor::{AppConfig, ExtractionOutcome, ReplySource, SessionState, SpecMentor};
use spec_mentor_llm::{AnthropicProvider, LlmError, LlmProvider};

fn claude_body(text: &str) -> String {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 42, "output_tokens": 17}
    })
    .to_string()
}

fn mentor_for(server: &Server, api_key: &str) -> SpecMentor {
    let config = AppConfig {
        base_url: Some(format!("{}/v1/messages", server.url())),
        ..Default::default()
    };
    let provider = AnthropicProvider::new(config.provider_config(Some(api_key.to_string())))
        .expect("client should build");
    let provider: Arc<dyn LlmProvider> = Arc::new(provider);
    SpecMentor::from_config(&config, Some(provider))
}

#[tokio::test]
async fn test_full_turn_over_http() {
    let mut server = Server::new_async().await;

    let reply_mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-3-5-sonnet-20241022",
            "max_tokens": 1500,
            "messages": [{"role": "user", "content": "I run a small farm"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(claude_body("What do you grow?"))
        .create_async()
        .await;

    let extraction_mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 1000})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(claude_body(
            "```json\n{\"projectType\": \"Farm Management Platform\", \"qualityScores\": {\"projectTypeClarity\": 90}}\n```",
        ))
        .create_async()
        .await;

    let mentor = mentor_for(&server, "test-key");
    let mut session = SessionState::new();
    let outcome = mentor.send(&mut session, "I run a small farm").await.unwrap();

    reply_mock.assert_async().await;
    extraction_mock.assert_async().await;

    assert_eq!(outcome.reply, "What do you grow?");
    assert_eq!(outcome.reply_source, ReplySource::Model);
    assert!(matches!(outcome.extraction, Some(ExtractionOutcome::Structured(_))));
    assert_eq!(
        session.context.project_type.as_deref(),
        Some("Farm Management Platform")
    );
    // tech 9, ux 9, business 27, dev 100
    assert_eq!(outcome.overall, 24);
}

#[tokio::test]
async fn test_rejected_key_gives_auth_reply() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mentor = mentor_for(&server, "bad-key");
    let mut session = SessionState::new();
    let outcome = mentor.send(&mut session, "hello there").await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.reply, AUTH_FAILURE_REPLY);
    assert!(matches!(
        outcome.reply_source,
        ReplySource::Fallback(LlmError::AuthenticationFailed { .. })
    ));
    assert!(outcome.extraction.is_none());
}

#[tokio::test]
async fn test_verify_credentials_over_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({
            "max_tokens": 10,
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(claude_body("Hi"))
        .create_async()
        .await;

    let mentor = mentor_for(&server, "test-key");
    assert!(mentor.verify_credentials().await);
    mock.assert_async().await;
}
