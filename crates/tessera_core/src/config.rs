//! # Arena Configuration
//!
//! Sizing parameters for a [`SlotArena`](crate::SlotArena), loaded once at
//! startup from TOML.
//!
//! ```toml
//! initial_capacity = 256
//! max_capacity = 4096
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a single slot arena.
///
/// The effective slot limit is the smaller of `max_capacity` and the
/// number of indices the arena's handle type can express.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Number of slots reserved up front.
    pub initial_capacity: u32,
    /// Upper bound on the slot count. `None` means the handle's index width.
    pub max_capacity: Option<u32>,
}

impl ArenaConfig {
    /// Creates a config with no reservation and no extra limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_capacity: 0,
            max_capacity: None,
        }
    }

    /// Sets the number of slots reserved up front.
    #[must_use]
    pub const fn with_initial_capacity(mut self, initial_capacity: u32) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the upper bound on the slot count.
    #[must_use]
    pub const fn with_max_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Checks that the values describe a usable arena.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `max_capacity` is zero or smaller
    /// than `initial_capacity`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.max_capacity {
            Some(0) => Err(ConfigError::Invalid(
                "max_capacity must be greater than zero".to_owned(),
            )),
            Some(max) if self.initial_capacity > max => Err(ConfigError::Invalid(format!(
                "initial_capacity {} exceeds max_capacity {max}",
                self.initial_capacity
            ))),
            _ => Ok(()),
        }
    }

    /// Parses and validates a config from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
