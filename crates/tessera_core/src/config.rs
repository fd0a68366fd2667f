//! # World Configuration
//!
//! Sizing knobs for a [`World`](crate::World), loaded once at startup from
//! TOML.
//!
//! ```toml
//! initial_entities = 4096
//! initial_components = 1024
//! max_entities = 100000
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::ecs::NIL_SLOT;
use crate::error::{EcsError, EcsResult};

/// World sizing configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Entity table slots reserved up front.
    pub initial_entities: usize,
    /// Elements reserved in each newly registered storage.
    pub initial_components: usize,
    /// Hard limit on entity table slots. `None` means unbounded.
    pub max_entities: Option<usize>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_entities: 64,
            initial_components: 0,
            max_entities: None,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML, has
    /// unknown keys, or describes an inconsistent configuration.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `max_entities` is too small to
    /// hold the built-in component types, or a reserve exceeds the number of
    /// addressable entity slots.
    pub fn validate(&self) -> EcsResult<()> {
        let slots = NIL_SLOT as usize;
        for (name, reserve) in [
            ("initial_entities", self.initial_entities),
            ("initial_components", self.initial_components),
        ] {
            if reserve > slots {
                return Err(EcsError::InvalidConfig(format!(
                    "{name} must be at most {slots}, got {reserve}"
                )));
            }
        }
        if let Some(max) = self.max_entities {
            if max < crate::World::BUILTIN_COUNT {
                return Err(EcsError::InvalidConfig(format!(
                    "max_entities must be at least {}, got {max}",
                    crate::World::BUILTIN_COUNT
                )));
            }
        }
        Ok(())
    }
}
