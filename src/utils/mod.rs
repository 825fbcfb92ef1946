//! Utilities
//!
//! The application error type and the filesystem locations under
//! `~/.spec-mentor`.

pub mod error;
pub mod paths;

pub use error::*;
pub use paths::*;
