//! Secure random bytes for salts, IVs and nonces
//!
//! Backed by the operating system generator. There is no fallback: if the
//! OS source fails the call fails.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptError, CryptResult};

use super::SecureBytes;

/// Fill a fresh buffer of `len` bytes from the OS generator
pub fn generate_random_bytes(len: usize) -> CryptResult<SecureBytes> {
    let mut bytes = SecureBytes::zeroed(len);
    fill_random(bytes.as_bytes_mut())?;
    Ok(bytes)
}

/// Fixed-size variant of [`generate_random_bytes`]
pub fn random_array<const N: usize>() -> CryptResult<[u8; N]> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

fn fill_random(buf: &mut [u8]) -> CryptResult<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        tracing::error!(error = %e, "OS random source failed");
        CryptError::EntropySourceUnavailable
    })
}
