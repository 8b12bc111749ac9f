//! # UI Error Types
//!
//! Recoverable failures surfaced by layers, animators and the interface.

use tessera_core::{ArenaError, ConfigError};
use thiserror::Error;

/// Errors that can occur in the UI system.
#[derive(Error, Debug)]
pub enum UiError {
    /// A layer, data, animator or animation arena is full.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;
