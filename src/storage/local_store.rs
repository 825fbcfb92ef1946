//! Local Key-Value Store
//!
//! A single JSON file of `sm_`-prefixed entries. Entries whose key mentions
//! `api` or `key` (case-insensitive) are encrypted with the store passphrase.
//! Other entries in the file are left alone, so `clear_all` only touches this
//! application's namespace.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::crypto::{decrypt_with_passphrase, encrypt_with_passphrase};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{ensure_parent_dir, store_path};

/// Namespace prefix for every entry written by this application
pub const STORE_PREFIX: &str = "sm_";

/// Environment variable holding the store passphrase
pub const PASSPHRASE_ENV: &str = "SPEC_MENTOR_STORE_PASSPHRASE";

/// Store key for the Anthropic API key
pub const API_KEY_STORE_KEY: &str = "api_key";

/// Whether a key's value is encrypted at rest
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("api") || key.contains("key")
}

fn namespaced(key: &str) -> String {
    format!("{}{}", STORE_PREFIX, key)
}

/// File-backed store for small JSON values
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    passphrase: Option<String>,
}

impl LocalStore {
    /// Open a store file. A blank passphrase counts as none.
    pub fn open(path: impl Into<PathBuf>, passphrase: Option<String>) -> Self {
        Self {
            path: path.into(),
            passphrase: passphrase.filter(|p| !p.is_empty()),
        }
    }

    /// Open the default store (~/.spec-mentor/store.json)
    pub fn open_default(passphrase: Option<String>) -> AppResult<Self> {
        Ok(Self::open(store_path()?, passphrase))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }

    fn passphrase_for(&self, key: &str) -> AppResult<&str> {
        self.passphrase.as_deref().ok_or_else(|| {
            AppError::config(format!(
                "'{}' is stored encrypted; set {} to read or write it",
                key, PASSPHRASE_ENV
            ))
        })
    }

    fn read_entries(&self) -> AppResult<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, Value>) -> AppResult<()> {
        ensure_parent_dir(&self.path)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Store a value, encrypting it when the key is sensitive
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let serialized = serde_json::to_value(value)?;
        let stored = if is_sensitive_key(key) {
            let passphrase = self.passphrase_for(key)?;
            Value::String(encrypt_with_passphrase(
                &serialized.to_string(),
                passphrase,
                &namespaced(key),
            )?)
        } else {
            serialized
        };

        let mut entries = self.read_entries()?;
        entries.insert(namespaced(key), stored);
        self.write_entries(&entries)?;
        debug!(key, encrypted = is_sensitive_key(key), "Saved store entry");
        Ok(())
    }

    /// Load a value; `None` when the key was never saved
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let entries = self.read_entries()?;
        let Some(stored) = entries.get(&namespaced(key)) else {
            return Ok(None);
        };

        let value = if is_sensitive_key(key) {
            let passphrase = self.passphrase_for(key)?;
            let encrypted = stored
                .as_str()
                .ok_or_else(|| AppError::storage(format!("'{}' is not an encrypted entry", key)))?;
            serde_json::from_str(&decrypt_with_passphrase(
                encrypted,
                passphrase,
                &namespaced(key),
            )?)?
        } else {
            serde_json::from_value(stored.clone())?
        };
        Ok(Some(value))
    }

    /// Load a value, logging and discarding any error
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to load store entry, using default");
                T::default()
            }
        }
    }

    /// Remove one entry
    pub fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(&namespaced(key)).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    /// Remove every entry in this application's namespace
    pub fn clear_all(&self) -> AppResult<()> {
        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(STORE_PREFIX));
        if entries.len() != before {
            self.write_entries(&entries)?;
        }
        debug!(removed = before - entries.len(), "Cleared store");
        Ok(())
    }

    /// Whether the store location is writable
    pub fn is_available(&self) -> bool {
        let marker = self.path.with_extension("writable");
        let result = ensure_parent_dir(&self.path)
            .and_then(|_| fs::write(&marker, b"test").map_err(AppError::from))
            .and_then(|_| fs::remove_file(&marker).map_err(AppError::from));
        result.is_ok()
    }
}
