//! Path management for envelope-crypt
//!
//! ## Path Resolution Order
//!
//! 1. `ENVELOPE_CRYPT_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/envelope-crypt` or `~/.config/envelope-crypt`
//! 3. Windows: `%APPDATA%\envelope-crypt`

use std::path::PathBuf;

use crate::error::CryptError;

/// Environment variable that overrides the config directory
pub const DIR_ENV_VAR: &str = "ENVELOPE_CRYPT_DIR";

/// Manages the paths used by envelope-crypt
#[derive(Debug, Clone)]
pub struct CryptPaths {
    base_dir: PathBuf,
}

impl CryptPaths {
    /// Resolve the config directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CryptError> {
        let base_dir = if let Ok(custom) = std::env::var(DIR_ENV_VAR) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create CryptPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the config directory exists
    pub fn ensure_directories(&self) -> Result<(), CryptError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CryptError::Io(format!("Failed to create config directory: {}", e)))
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CryptError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                CryptError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("envelope-crypt"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CryptError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CryptError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("envelope-crypt"))
}
