//! Passphrase key derivation
//!
//! Two derivations are provided:
//!
//! - PBKDF2-HMAC-SHA1 for the legacy envelope format. SHA-1 is the RFC 2898
//!   default PRF and existing envelopes were produced with it.
//! - Argon2id for the authenticated `v2:` format.
//!
//! Both are deliberately slow; the cost scales with the configured
//! iteration or pass count.

use argon2::{Argon2, Params};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::error::{CryptError, CryptResult};

/// Parameters for PBKDF2 derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// PBKDF2 iteration count (default: 1000)
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Output length in bytes (default: 32, a 256-bit key)
    #[serde(default = "default_key_length")]
    pub key_length: usize,
}

fn default_iterations() -> u32 {
    1000
}

fn default_key_length() -> usize {
    32
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            key_length: default_key_length(),
        }
    }
}

impl KdfParams {
    /// Check the parameters describe a usable derivation
    pub fn validate(&self) -> CryptResult<()> {
        if self.iterations == 0 {
            return Err(CryptError::Config(
                "KDF iterations must be at least 1".to_string(),
            ));
        }
        if !matches!(self.key_length, 16 | 24 | 32) {
            return Err(CryptError::Config(format!(
                "Unsupported key length: {} bytes (expected 16, 24 or 32)",
                self.key_length
            )));
        }
        Ok(())
    }
}

/// Parameters for Argon2id derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Time cost (passes, default: 3)
    pub time_cost: u32,
    /// Parallelism degree (default: 4)
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    fn to_argon2(self, output_len: usize) -> CryptResult<Params> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(output_len),
        )
        .map_err(|e| CryptError::Config(format!("Invalid Argon2 parameters: {}", e)))
    }

    pub fn validate(&self) -> CryptResult<()> {
        self.to_argon2(32).map(|_| ())
    }
}

/// A derived encryption key, wiped on drop
pub struct DerivedKey {
    key: Zeroizing<Vec<u8>>,
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("len", &self.key.len())
            .finish()
    }
}

/// Derive a key from a passphrase and salt with PBKDF2-HMAC-SHA1
///
/// Deterministic for a given (passphrase, salt, params). Any passphrase is
/// accepted, including the empty string.
pub fn derive_key(passphrase: &str, salt: &[u8], params: &KdfParams) -> CryptResult<DerivedKey> {
    params.validate()?;

    let mut key = Zeroizing::new(vec![0u8; params.key_length]);
    pbkdf2::pbkdf2_hmac::<Sha1>(passphrase.as_bytes(), salt, params.iterations, &mut key);

    Ok(DerivedKey { key })
}

/// Derive a 32-byte key from a passphrase and salt with Argon2id
pub fn derive_argon2_key(
    passphrase: &str,
    salt: &[u8],
    params: &Argon2Params,
) -> CryptResult<DerivedKey> {
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.to_argon2(32)?,
    );

    let mut key = Zeroizing::new(vec![0u8; 32]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| CryptError::Config(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}
