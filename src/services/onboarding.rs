//! Onboarding
//!
//! Steps that need both the provider and the local store.

use chrono::Utc;
use tracing::info;

use crate::models::setup::{SetupState, SETUP_STATE_KEY};
use crate::services::mentor::SpecMentor;
use crate::storage::{LocalStore, API_KEY_STORE_KEY, PASSPHRASE_ENV};
use crate::utils::error::{AppError, AppResult};

/// Verify `key` with `mentor` and record the outcome.
///
/// An accepted key is stored before the setup state, so a completed setup
/// always has a key behind it. Returns whether the key was accepted.
pub async fn register_api_key(
    store: &LocalStore,
    setup: &mut SetupState,
    mentor: &SpecMentor,
    key: &str,
) -> AppResult<bool> {
    if !store.has_passphrase() {
        return Err(AppError::config(format!(
            "set {} so the API key can be stored encrypted",
            PASSPHRASE_ENV
        )));
    }

    let valid = mentor.verify_credentials().await;
    setup.record_validation(valid, Utc::now());
    if valid {
        store.save(API_KEY_STORE_KEY, &key)?;
    }
    store.save(SETUP_STATE_KEY, setup)?;
    info!(valid, "Recorded API key check");
    Ok(valid)
}
