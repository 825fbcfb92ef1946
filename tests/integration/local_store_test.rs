//! Local Store Integration Tests
//!
//! Persisted setup state and the encrypted API key, read back through fresh
//! store handles the way separate runs of the binary would.

use std::fs;

use chrono::Utc;
use serde_json::Value;

use spec_mentor::models::setup::SETUP_STATE_KEY;
use spec_mentor::storage::API_KEY_STORE_KEY;
use spec_mentor::{AppError, LocalStore, SetupState};

const PASSPHRASE: &str = "correct horse battery staple";

fn store_file() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    (dir, path)
}

fn raw_entries(path: &std::path::Path) -> serde_json::Map<String, Value> {
    let content = fs::read_to_string(path).unwrap();
    serde_json::from_str::<Value>(&content)
        .unwrap()
        .as_object()
        .unwrap()
        .clone()
}

#[test]
fn test_setup_state_survives_reopen() {
    let (_dir, path) = store_file();

    let mut state = SetupState::default();
    state.record_validation(true, Utc::now());
    LocalStore::open(&path, None)
        .save(SETUP_STATE_KEY, &state)
        .unwrap();

    let reopened = LocalStore::open(&path, None);
    let loaded: SetupState = reopened.load(SETUP_STATE_KEY).unwrap().unwrap();
    assert_eq!(loaded, state);
    assert!(loaded.api_configuration.is_valid);

    let raw = raw_entries(&path);
    assert!(raw.contains_key("sm_appState"));
    assert!(raw["sm_appState"].is_object());
}

#[test]
fn test_api_key_is_encrypted_at_rest() {
    let (_dir, path) = store_file();

    LocalStore::open(&path, Some(PASSPHRASE.to_string()))
        .save(API_KEY_STORE_KEY, &"sk-ant-secret".to_string())
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("sk-ant-secret"));

    let reopened = LocalStore::open(&path, Some(PASSPHRASE.to_string()));
    let key: Option<String> = reopened.load(API_KEY_STORE_KEY).unwrap();
    assert_eq!(key.as_deref(), Some("sk-ant-secret"));
}

#[test]
fn test_wrong_passphrase_cannot_read_key() {
    let (_dir, path) = store_file();

    LocalStore::open(&path, Some(PASSPHRASE.to_string()))
        .save(API_KEY_STORE_KEY, &"sk-ant-secret".to_string())
        .unwrap();

    let wrong = LocalStore::open(&path, Some("something else".to_string()));
    assert!(wrong.load::<String>(API_KEY_STORE_KEY).is_err());

    let none = LocalStore::open(&path, None);
    assert!(matches!(
        none.load::<String>(API_KEY_STORE_KEY),
        Err(AppError::Config(_))
    ));
}

#[test]
fn test_sensitive_key_needs_passphrase_to_save() {
    let (_dir, path) = store_file();
    let store = LocalStore::open(&path, None);

    let result = store.save(API_KEY_STORE_KEY, &"sk-ant-secret".to_string());
    assert!(matches!(result, Err(AppError::Config(_))));
    assert!(!path.exists());
}

#[test]
fn test_clear_all_keeps_foreign_entries() {
    let (_dir, path) = store_file();
    fs::write(&path, r#"{"other_app": {"theme": "dark"}}"#).unwrap();

    let store = LocalStore::open(&path, Some(PASSPHRASE.to_string()));
    store.save(SETUP_STATE_KEY, &SetupState::default()).unwrap();
    store
        .save(API_KEY_STORE_KEY, &"sk-ant-secret".to_string())
        .unwrap();
    assert_eq!(raw_entries(&path).len(), 3);

    store.clear_all().unwrap();

    let raw = raw_entries(&path);
    assert_eq!(raw.len(), 1);
    assert!(raw.contains_key("other_app"));
    assert!(store.load::<SetupState>(SETUP_STATE_KEY).unwrap().is_none());
}

#[test]
fn test_corrupt_setup_state_loads_default() {
    let (_dir, path) = store_file();
    fs::write(&path, r#"{"sm_appState": "not an object"}"#).unwrap();

    let store = LocalStore::open(&path, None);
    let state: SetupState = store.load_or_default(SETUP_STATE_KEY);
    assert_eq!(state, SetupState::default());
    assert!(store.is_available());
}
