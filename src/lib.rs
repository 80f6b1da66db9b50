//! envelope-crypt - passphrase encryption of text into base64 envelopes
//!
//! A caller supplies plaintext and a passphrase and gets back one base64
//! string holding everything needed to decrypt it later with the same
//! passphrase.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: entropy, key derivation, ciphers and the envelope codec
//! - `config`: cryptographic parameters, paths and settings persistence
//! - `cli`: command handlers for the `envelope-crypt` binary
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust
//! let envelope = envelope_crypt::encrypt("hello world", "secret")?;
//! assert_eq!(envelope_crypt::decrypt(&envelope, "secret")?, "hello world");
//! # Ok::<(), envelope_crypt::CryptError>(())
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;

pub use config::CryptoConfig;
pub use crypto::{decrypt, encrypt, EnvelopeFormat, PassphraseCipher};
pub use error::{CryptError, CryptResult};
