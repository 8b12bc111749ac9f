//! # Core Error Types
//!
//! Recoverable failures of handle storage and configuration loading.
//!
//! Stale or foreign handles are not errors at this layer: they are caller
//! contract violations, checked up front with `is_valid()` and asserted on.

use thiserror::Error;

/// Errors that can occur while allocating slots.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena already holds as many slots as its handle type can index.
    #[error("arena capacity exceeded: at most {capacity} slots can be allocated")]
    CapacityExceeded {
        /// Maximum slot count of the arena.
        capacity: u32,
    },
}

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML source could not be parsed into the config structure.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed fine but describe an unusable setup.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for slot allocation.
pub type ArenaResult<T> = Result<T, ArenaError>;
