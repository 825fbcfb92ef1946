//! Storage Layer
//!
//! Handles persistence: the JSON config file and the local key-value store.

pub mod config;
pub mod crypto;
pub mod local_store;

pub use config::*;
pub use local_store::*;
