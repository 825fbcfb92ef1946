//! Mentoring Session Integration Tests
//!
//! Drives full turns through `SpecMentor` with a queued mock provider:
//! - Reply call followed by structured extraction, merge and scoring
//! - Keyword fallback when extraction returns unusable text
//! - Canned replies when the reply call fails
//! - Readiness once every category is well covered

use std::sync::Arc;

use spec_mentor::services::prompt::{MENTOR_SYSTEM_PROMPT, RATE_LIMIT_REPLY};
use spec_mentor::{ExtractionFailure, ExtractionOutcome, ReplySource, SessionState, SpecMentor};
use spec_mentor_core::{ConfidenceCategory, SpecificationContext};
use spec_mentor_llm::{LlmError, LlmProvider, LlmRequestOptions, MessageRole};

use crate::mock_provider::{error_response, text_response, MockLlmProvider};

const SHOP_EXTRACTION: &str = r#"{
    "projectType": "E-commerce Platform",
    "targetUsers": "independent potters",
    "keyFeatures": ["payments", "search"],
    "qualityScores": {"projectTypeClarity": 80, "userDefinitionDepth": 40},
    "missingAreas": ["security", "performance"]
}"#;

fn mentor_with(mock: &Arc<MockLlmProvider>) -> SpecMentor {
    let provider: Arc<dyn LlmProvider> = mock.clone();
    SpecMentor::new(Some(provider))
}

// ============================================================================
// Structured Extraction Path
// ============================================================================

#[tokio::test]
async fn test_turn_with_structured_extraction() {
    let mock = Arc::new(MockLlmProvider::new(vec![
        text_response("Lovely! Who buys your pottery today?"),
        text_response(SHOP_EXTRACTION),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    let outcome = mentor
        .send(&mut session, "I want to sell my pottery online")
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Lovely! Who buys your pottery today?");
    assert_eq!(outcome.reply_source, ReplySource::Model);
    assert!(matches!(outcome.extraction, Some(ExtractionOutcome::Structured(_))));

    let ctx = &session.context;
    assert_eq!(ctx.project_type.as_deref(), Some("E-commerce Platform"));
    assert_eq!(ctx.target_users.as_deref(), Some("independent potters"));
    assert_eq!(ctx.key_features, vec!["payments", "search"]);
    assert_eq!(ctx.missing_areas, vec!["security", "performance"]);
    assert_eq!(ctx.conversation_depth, 3);
    assert!(ctx.last_analyzed.is_some());

    let metrics = outcome.confidence;
    assert_eq!(metrics.get(ConfidenceCategory::TechnicalArchitecture), 8);
    assert_eq!(metrics.get(ConfidenceCategory::UserExperience), 24);
    assert_eq!(metrics.get(ConfidenceCategory::BusinessLogic), 34);
    assert_eq!(metrics.get(ConfidenceCategory::SecurityCompliance), 0);
    assert_eq!(metrics.get(ConfidenceCategory::PerformanceScaling), 0);
    assert_eq!(metrics.get(ConfidenceCategory::DevelopmentEnvironment), 100);
    assert_eq!(outcome.overall, 28);
    assert!(!outcome.can_generate_spec);
    assert_eq!(session.confidence, metrics);
}

#[tokio::test]
async fn test_reply_and_extraction_calls_are_shaped_differently() {
    let mock = Arc::new(MockLlmProvider::new(vec![
        text_response("Who buys your pottery?"),
        text_response(SHOP_EXTRACTION),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    mentor
        .send(&mut session, "I want to sell my pottery online")
        .await
        .unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);

    // reply call: the welcome turn is not sent, the system prompt carries the context
    let reply_call = &calls[0];
    assert_eq!(reply_call.messages.len(), 1);
    assert_eq!(reply_call.messages[0].role, MessageRole::User);
    assert_eq!(reply_call.messages[0].content, "I want to sell my pottery online");
    let system = reply_call.system.as_deref().unwrap();
    assert!(system.starts_with(MENTOR_SYSTEM_PROMPT));
    assert!(system.contains("Just starting the specification process."));
    assert_eq!(reply_call.options, LlmRequestOptions::new(0.7, 1500));

    // extraction call: one user message, no system prompt
    let extraction_call = &calls[1];
    assert!(extraction_call.system.is_none());
    assert_eq!(extraction_call.messages.len(), 1);
    assert_eq!(extraction_call.options, LlmRequestOptions::new(0.3, 1000));
    let prompt = &extraction_call.messages[0].content;
    assert!(prompt.contains("user: I want to sell my pottery online"));
    assert!(prompt.contains("assistant: Who buys your pottery?"));
}

#[tokio::test]
async fn test_second_turn_sees_accumulated_context() {
    let mock = Arc::new(MockLlmProvider::new(vec![
        text_response("Who buys your pottery?"),
        text_response(SHOP_EXTRACTION),
        text_response("How will people pay?"),
        text_response(r#"{"keyFeatures": ["search", "reviews"], "missingAreas": ["security"]}"#),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    mentor.send(&mut session, "I sell pottery").await.unwrap();
    mentor.send(&mut session, "Mostly collectors").await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 4);
    let system = calls[2].system.as_deref().unwrap();
    assert!(system.contains("- Project Type: E-commerce Platform"));
    assert!(system.contains("- Key Features Identified: payments, search"));
    assert_eq!(calls[2].messages.len(), 3);

    assert_eq!(session.context.key_features, vec!["payments", "search", "reviews"]);
    assert_eq!(session.context.missing_areas, vec!["security"]);
    assert_eq!(session.context.conversation_depth, 5);
}

// ============================================================================
// Fallback Extraction Path
// ============================================================================

#[tokio::test]
async fn test_unparseable_extraction_uses_keyword_fallback() {
    let mock = Arc::new(MockLlmProvider::new(vec![
        text_response("Great! Who are your customers?"),
        text_response("I'm not able to produce JSON right now."),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    let outcome = mentor
        .send(&mut session, "I want to open an online shop with payments and search")
        .await
        .unwrap();

    match &outcome.extraction {
        Some(ExtractionOutcome::Fallback { reason, .. }) => {
            assert!(matches!(reason, ExtractionFailure::InvalidJson(_)));
        }
        other => panic!("expected keyword fallback, got {:?}", other),
    }

    assert_eq!(session.context.project_type.as_deref(), Some("E-commerce Platform"));
    assert_eq!(session.context.key_features, vec!["payments", "search"]);
    assert!(session.context.quality_scores.is_empty());

    let metrics = outcome.confidence;
    assert_eq!(metrics.get(ConfidenceCategory::TechnicalArchitecture), 20);
    assert_eq!(metrics.get(ConfidenceCategory::UserExperience), 0);
    assert_eq!(metrics.get(ConfidenceCategory::BusinessLogic), 40);
    assert_eq!(metrics.get(ConfidenceCategory::SecurityCompliance), 0);
    assert_eq!(metrics.get(ConfidenceCategory::PerformanceScaling), 20);
    assert_eq!(outcome.overall, 30);
}

#[tokio::test]
async fn test_fallback_turn_keeps_missing_areas_and_quality_scores() {
    let mock = Arc::new(MockLlmProvider::new(vec![
        text_response("Who buys your pottery?"),
        text_response(SHOP_EXTRACTION),
        text_response("Do you need customer logins?"),
        error_response(LlmError::ServerError {
            message: "overloaded".to_string(),
            status: Some(529),
        }),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    mentor.send(&mut session, "I sell pottery").await.unwrap();
    let before = session.confidence;

    let outcome = mentor
        .send(&mut session, "Yes, a login and a dashboard")
        .await
        .unwrap();

    assert!(outcome.extraction.as_ref().is_some_and(ExtractionOutcome::is_fallback));
    assert_eq!(session.context.missing_areas, vec!["security", "performance"]);
    assert_eq!(session.context.key_features, vec!["payments", "search", "login", "dashboard"]);

    // quality path still applies, and the login feature earns the auth bonus
    assert_eq!(outcome.confidence.get(ConfidenceCategory::SecurityCompliance), 20);
    assert_eq!(
        outcome.confidence.get(ConfidenceCategory::BusinessLogic),
        before.get(ConfidenceCategory::BusinessLogic)
    );
}

// ============================================================================
// Reply Failures
// ============================================================================

#[tokio::test]
async fn test_rate_limited_reply_skips_extraction() {
    let mock = Arc::new(MockLlmProvider::new(vec![
        error_response(LlmError::RateLimited {
            message: "too many requests".to_string(),
            retry_after: Some(30),
        }),
        text_response(SHOP_EXTRACTION),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    let outcome = mentor
        .send(&mut session, "I want an online shop")
        .await
        .unwrap();

    assert_eq!(outcome.reply, RATE_LIMIT_REPLY);
    assert!(matches!(outcome.reply_source, ReplySource::Fallback(LlmError::RateLimited { .. })));
    assert!(outcome.extraction.is_none());
    assert_eq!(mock.calls().len(), 1);
    assert_eq!(mock.remaining(), 1);

    assert_eq!(session.context, SpecificationContext::new());
    assert_eq!(session.conversation.len(), 3);
    assert_eq!(session.conversation.turns()[2].text, RATE_LIMIT_REPLY);
    assert_eq!(outcome.overall, 17);
}

#[tokio::test]
async fn test_network_failure_gets_tailored_reply() {
    let mock = Arc::new(MockLlmProvider::new(vec![error_response(LlmError::NetworkError {
        message: "connection refused".to_string(),
    })]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    let outcome = mentor
        .send(&mut session, "A website for my bakery")
        .await
        .unwrap();

    assert!(outcome.reply.contains("runs in the browser"));
    assert!(matches!(outcome.reply_source, ReplySource::Fallback(_)));
}

#[tokio::test]
async fn test_empty_model_reply_still_extracts() {
    let mock = Arc::new(MockLlmProvider::new(vec![
        text_response("   "),
        text_response(SHOP_EXTRACTION),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    let outcome = mentor.send(&mut session, "pottery shop").await.unwrap();

    assert_eq!(outcome.reply_source, ReplySource::Model);
    assert!(outcome.reply.contains("couldn't come up with a response"));
    assert!(matches!(outcome.extraction, Some(ExtractionOutcome::Structured(_))));
    assert_eq!(mock.calls().len(), 2);
}

// ============================================================================
// Readiness
// ============================================================================

#[tokio::test]
async fn test_well_covered_conversation_is_ready() {
    let full = r#"{
        "projectType": "Booking Platform",
        "targetUsers": "yoga studios",
        "mainProblem": "double-booked classes",
        "keyFeatures": ["calendar", "payments", "login"],
        "securityNeeds": ["encryption at rest", "GDPR"],
        "performanceNeeds": ["1000 concurrent users", "pages under 1s"],
        "qualityScores": {
            "projectTypeClarity": 100,
            "userDefinitionDepth": 100,
            "problemDefinitionDepth": 100,
            "featureSpecificity": 100,
            "technicalSpecificity": 100,
            "dataModelClarity": 100,
            "securityConsiderations": 100,
            "performanceConsiderations": 100,
            "integrationClarity": 100
        },
        "missingAreas": []
    }"#;
    let mock = Arc::new(MockLlmProvider::new(vec![
        text_response("That sounds complete. Shall we write it up?"),
        text_response(full),
    ]));
    let mentor = mentor_with(&mock);
    let mut session = SessionState::new();

    let outcome = mentor
        .send(&mut session, "Here is everything about my yoga booking idea")
        .await
        .unwrap();

    for category in ConfidenceCategory::ALL {
        assert_eq!(outcome.confidence.get(category), 100, "{:?}", category);
    }
    assert_eq!(outcome.overall, 100);
    assert!(outcome.can_generate_spec);
    assert!(session.can_generate_spec());
    assert!(session.context.missing_areas.is_empty());
}

#[tokio::test]
async fn test_verify_credentials_uses_health_check() {
    let ok = Arc::new(MockLlmProvider::new(vec![]));
    assert!(mentor_with(&ok).verify_credentials().await);

    let rejected = Arc::new(MockLlmProvider::new(vec![error_response(
        LlmError::AuthenticationFailed {
            message: "invalid x-api-key".to_string(),
        },
    )]));
    assert!(!mentor_with(&rejected).verify_credentials().await);
}
