//! Cryptographic parameters
//!
//! Key size, iteration count, block size and salt length are carried in
//! [`CryptoConfig`] rather than module constants, so they can be tuned
//! without touching call sites. The defaults reproduce the legacy envelope
//! format exactly.

use serde::{Deserialize, Serialize};

use crate::crypto::{Argon2Params, CipherParams, EnvelopeFormat, KdfParams};
use crate::error::{CryptError, CryptResult};

/// Smallest salt accepted by either key derivation
const MIN_SALT_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// PBKDF2 parameters for legacy envelopes
    #[serde(default)]
    pub kdf: KdfParams,

    /// Block cipher parameters for legacy envelopes
    #[serde(default)]
    pub cipher: CipherParams,

    /// Salt length in bytes for legacy envelopes (default: 32)
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,

    /// Argon2id parameters for authenticated envelopes
    #[serde(default)]
    pub argon2: Argon2Params,

    /// Format used for new envelopes
    #[serde(default)]
    pub format: EnvelopeFormat,
}

fn default_salt_len() -> usize {
    32
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            cipher: CipherParams::default(),
            salt_len: default_salt_len(),
            argon2: Argon2Params::default(),
            format: EnvelopeFormat::default(),
        }
    }
}

impl CryptoConfig {
    /// Check every parameter group
    pub fn validate(&self) -> CryptResult<()> {
        self.kdf.validate()?;
        self.cipher.validate()?;
        if self.salt_len < MIN_SALT_LEN {
            return Err(CryptError::Config(format!(
                "Salt must be at least {} bytes, got {}",
                MIN_SALT_LEN, self.salt_len
            )));
        }
        self.argon2.validate()?;
        Ok(())
    }
}
