//! CLI command handlers
//!
//! Bridges the clap argument parsing with the crypto layer.

pub mod encrypt;

pub use encrypt::{handle_crypt_command, CryptCommands};
