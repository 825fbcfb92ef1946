//! Onboarding Integration Tests
//!
//! Registering an API key against a mock provider and a temporary store.

use std::sync::Arc;

use spec_mentor::models::setup::SETUP_STATE_KEY;
use spec_mentor::services::onboarding::register_api_key;
use spec_mentor::storage::API_KEY_STORE_KEY;
use spec_mentor::{AppError, LocalStore, SetupState, SpecMentor};
use spec_mentor_llm::{LlmError, LlmProvider};

use crate::mock_provider::{error_response, MockLlmProvider};

fn mentor_with(mock: &Arc<MockLlmProvider>) -> SpecMentor {
    let provider: Arc<dyn LlmProvider> = mock.clone();
    SpecMentor::new(Some(provider))
}

fn temp_store(passphrase: Option<&str>) -> (tempfile::TempDir, LocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path().join("store.json"), passphrase.map(str::to_string));
    (dir, store)
}

#[tokio::test]
async fn test_accepted_key_is_stored_with_completed_setup() {
    let (_dir, store) = temp_store(Some("pass"));
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let mut setup = SetupState::default();

    let valid = register_api_key(&store, &mut setup, &mentor_with(&mock), "sk-ant-good")
        .await
        .unwrap();

    assert!(valid);
    assert!(setup.is_ready());
    let saved: SetupState = store.load(SETUP_STATE_KEY).unwrap().unwrap();
    assert_eq!(saved, setup);
    let key: Option<String> = store.load(API_KEY_STORE_KEY).unwrap();
    assert_eq!(key.as_deref(), Some("sk-ant-good"));
}

#[tokio::test]
async fn test_missing_passphrase_writes_nothing() {
    let (_dir, store) = temp_store(None);
    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let mut setup = SetupState::default();

    let err = register_api_key(&store, &mut setup, &mentor_with(&mock), "sk-ant-good")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Config(_)));
    assert!(!setup.api_configuration.is_valid);
    assert!(store.load::<SetupState>(SETUP_STATE_KEY).unwrap().is_none());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_rejected_key_is_recorded_but_not_stored() {
    let (_dir, store) = temp_store(Some("pass"));
    let mock = Arc::new(MockLlmProvider::new(vec![error_response(
        LlmError::AuthenticationFailed {
            message: "invalid x-api-key".to_string(),
        },
    )]));
    let mut setup = SetupState::default();

    let valid = register_api_key(&store, &mut setup, &mentor_with(&mock), "sk-ant-bad")
        .await
        .unwrap();

    assert!(!valid);
    assert!(!setup.is_ready());
    let saved: SetupState = store.load(SETUP_STATE_KEY).unwrap().unwrap();
    assert!(saved.api_configuration.last_validated.is_some());
    assert!(store.load::<String>(API_KEY_STORE_KEY).unwrap().is_none());
}
