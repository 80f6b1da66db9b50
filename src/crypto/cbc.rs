//! Rijndael-CBC with PKCS#7 padding
//!
//! Encryption always appends 1..=block_size padding bytes, so an empty input
//! still produces one full block. On decryption the padding check walks the
//! whole final block and folds every comparison into one flag instead of
//! returning at the first mismatch.

use serde::{Deserialize, Serialize};

use crate::error::{CryptError, CryptResult};

use super::rijndael::Rijndael;
use super::SecureBytes;

/// Block cipher parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    /// Block size in bytes (default: 32, a 256-bit block). Also the IV length.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

fn default_block_size() -> usize {
    32
}

impl Default for CipherParams {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
        }
    }
}

impl CipherParams {
    pub fn validate(&self) -> CryptResult<()> {
        if !matches!(self.block_size, 16 | 24 | 32) {
            return Err(CryptError::Config(format!(
                "Unsupported block size: {} bytes (expected 16, 24 or 32)",
                self.block_size
            )));
        }
        Ok(())
    }

    /// Ciphertext length produced for a plaintext of `len` bytes
    pub fn padded_len(&self, len: usize) -> usize {
        (len / self.block_size + 1) * self.block_size
    }
}

/// Encrypt `plaintext` under `key` and `iv`
pub fn cipher_encrypt(
    plaintext: &[u8],
    key: &[u8],
    iv: &[u8],
    params: &CipherParams,
) -> CryptResult<Vec<u8>> {
    let cipher = keyed_cipher(key, iv, params)?;
    let bs = params.block_size;

    let total = params.padded_len(plaintext.len());
    let pad = (total - plaintext.len()) as u8;

    let mut buf = SecureBytes::with_capacity(total);
    buf.extend_from_slice(plaintext);
    buf.extend_from_slice(&vec![pad; pad as usize]);

    let mut prev = iv.to_vec();
    for block in buf.chunks_exact_mut(bs) {
        for (b, p) in block.iter_mut().zip(&prev) {
            *b ^= p;
        }
        cipher.encrypt_block(block);
        prev.copy_from_slice(block);
    }

    Ok(buf.as_bytes().to_vec())
}

/// Decrypt `ciphertext` under `key` and `iv` and strip the padding
///
/// Fails with [`CryptError::CryptoFailure`] if the ciphertext is not a
/// positive multiple of the block size or the padding is malformed.
pub fn cipher_decrypt(
    ciphertext: &[u8],
    key: &[u8],
    iv: &[u8],
    params: &CipherParams,
) -> CryptResult<SecureBytes> {
    let (plaintext, padding_ok) = decrypt_unchecked(ciphertext, key, iv, params)?;
    if !padding_ok {
        return Err(CryptError::CryptoFailure);
    }
    Ok(plaintext)
}

/// Decrypt and strip padding without failing on a bad pad
///
/// Returns the stripped buffer and whether the padding was well formed, so
/// the caller can finish its own checks before reporting either failure.
pub(crate) fn decrypt_unchecked(
    ciphertext: &[u8],
    key: &[u8],
    iv: &[u8],
    params: &CipherParams,
) -> CryptResult<(SecureBytes, bool)> {
    let cipher = keyed_cipher(key, iv, params)?;
    let bs = params.block_size;

    if ciphertext.is_empty() || ciphertext.len() % bs != 0 {
        return Err(CryptError::CryptoFailure);
    }

    let mut buf = SecureBytes::from(ciphertext);
    let mut prev = iv.to_vec();
    for block in buf.chunks_exact_mut(bs) {
        let saved = block.to_vec();
        cipher.decrypt_block(block);
        for (b, p) in block.iter_mut().zip(&prev) {
            *b ^= p;
        }
        prev = saved;
    }

    let (pad, padding_ok) = check_padding(&buf[buf.len() - bs..]);
    let keep = buf.len() - pad;
    buf.truncate(keep);

    Ok((buf, padding_ok))
}

fn keyed_cipher(key: &[u8], iv: &[u8], params: &CipherParams) -> CryptResult<Rijndael> {
    params.validate()?;
    if iv.len() != params.block_size {
        return Err(CryptError::Config(format!(
            "IV must be {} bytes, got {}",
            params.block_size,
            iv.len()
        )));
    }
    Rijndael::new(key, params.block_size)
}

/// Inspect the final block. Returns the number of bytes to strip (clamped to
/// the block) and whether the padding was valid.
fn check_padding(last_block: &[u8]) -> (usize, bool) {
    let bs = last_block.len();
    let value = last_block[bs - 1];
    let pad = value as usize;

    let mut bad = (pad == 0) as u8 | (pad > bs) as u8;
    for (i, &b) in last_block.iter().rev().enumerate() {
        let in_pad = (i < pad) as u8;
        bad |= in_pad & (b != value) as u8;
    }

    (pad.min(bs), bad == 0)
}
