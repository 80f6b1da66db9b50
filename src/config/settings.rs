//! User settings for envelope-crypt
//!
//! Persists the cryptographic parameters the command-line tool uses.

use serde::{Deserialize, Serialize};

use super::crypto::CryptoConfig;
use super::paths::CryptPaths;
use crate::crypto::EnvelopeFormat;
use crate::error::CryptError;

/// User settings for envelope-crypt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Parameters for new and existing envelopes
    #[serde(default)]
    pub crypto: CryptoConfig,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            // New files default to the authenticated format; the library
            // default stays legacy for wire compatibility.
            crypto: CryptoConfig {
                format: EnvelopeFormat::Authenticated,
                ..CryptoConfig::default()
            },
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &CryptPaths) -> Result<Self, CryptError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                CryptError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                CryptError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.crypto.validate()?;
            tracing::debug!(path = %settings_path.display(), "loaded settings");
            Ok(settings)
        } else {
            // Written only by `config --init`
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CryptPaths) -> Result<(), CryptError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            CryptError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            CryptError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
