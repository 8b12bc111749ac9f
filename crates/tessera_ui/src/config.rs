//! # Interface Configuration
//!
//! Arena sizing for every storage the interface owns, loaded once at
//! startup from TOML:
//!
//! ```toml
//! [layers]
//! max_capacity = 16
//!
//! [animations]
//! initial_capacity = 512
//! ```

use serde::{Deserialize, Serialize};
use tessera_core::{ArenaConfig, ConfigError};

/// Sizing for the arenas of a [`UserInterface`](crate::UserInterface) and
/// the layers and animators created through it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    /// Arena of layer instances.
    pub layers: ArenaConfig,
    /// Per-layer data arenas.
    pub layer_data: ArenaConfig,
    /// Arena of animator instances.
    pub animators: ArenaConfig,
    /// Per-animator animation arenas.
    pub animations: ArenaConfig,
}

impl UiConfig {
    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first section's [`ConfigError::Invalid`], prefixed with
    /// the section name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, section) in [
            ("layers", &self.layers),
            ("layer_data", &self.layer_data),
            ("animators", &self.animators),
            ("animations", &self.animations),
        ] {
            section.validate().map_err(|err| match err {
                ConfigError::Invalid(reason) => ConfigError::Invalid(format!("[{name}] {reason}")),
                other => other,
            })?;
        }
        Ok(())
    }

    /// Parses and validates a config from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}
