//! Configuration module for envelope-crypt
//!
//! This module provides:
//! - Cryptographic parameters shared by the library and the CLI
//! - Config directory resolution
//! - Settings persistence

pub mod crypto;
pub mod paths;
pub mod settings;

pub use crypto::CryptoConfig;
pub use paths::CryptPaths;
pub use settings::Settings;
