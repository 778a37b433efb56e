//! # Registry Configuration
//!
//! Settings for the bag registry and its key generator. Defaults match the
//! behavior expected by every consumer; the environment can override them.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::nonce::{DEFAULT_NONCE_LENGTH, MAX_NONCE_LENGTH};

/// Environment variable overriding [`RegistryConfig::nonce_length`].
pub const ENV_NONCE_LENGTH: &str = "CLSV_NONCE_LENGTH";

/// Configuration for a [`BagRegistry`](crate::BagRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of least-significant digits kept from each nonce.
    pub nonce_length: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            nonce_length: DEFAULT_NONCE_LENGTH,
        }
    }
}

impl RegistryConfig {
    /// Build configuration from the process environment.
    ///
    /// Absent variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is present but unparseable or
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_NONCE_LENGTH) {
            config.nonce_length = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_NONCE_LENGTH,
                value: raw.clone(),
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is within range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nonce_length == 0 || self.nonce_length > MAX_NONCE_LENGTH {
            return Err(ConfigError::InvalidNonceLength {
                length: self.nonce_length,
                max: MAX_NONCE_LENGTH,
            });
        }
        Ok(())
    }
}
