//! Cryptographic functions for envelope-crypt
//!
//! Provides passphrase encryption of text into base64 envelopes:
//! PBKDF2-HMAC-SHA1 with Rijndael-256-CBC for the legacy format, and
//! Argon2id with AES-256-GCM for the authenticated `v2:` format.

pub mod authenticated;
pub mod cbc;
pub mod cipher;
pub mod entropy;
pub mod envelope;
pub mod key_derivation;
pub mod rijndael;
pub mod secure_memory;

pub use cbc::{cipher_decrypt, cipher_encrypt, CipherParams};
pub use cipher::{decrypt, encrypt, EnvelopeFormat, PassphraseCipher};
pub use entropy::generate_random_bytes;
pub use envelope::{Envelope, EnvelopeLayout};
pub use key_derivation::{derive_argon2_key, derive_key, Argon2Params, DerivedKey, KdfParams};
pub use secure_memory::{SecureBytes, SecureString};
