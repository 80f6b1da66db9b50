//! Authenticated `v2:` envelopes (AES-256-GCM with Argon2id)
//!
//! Layout:
//!
//! ```text
//! "v2:" || base64( salt[16] || memory_cost[4] || time_cost[4] || parallelism[4]
//!                  || nonce[12] || ciphertext || tag[16] )
//! ```
//!
//! The Argon2 costs are big-endian `u32`s, so an envelope opens with the
//! parameters it was sealed with whatever the local configuration says.
//! Salt and costs together form the header, which is bound to the
//! ciphertext as GCM associated data.
//!
//! The prefix never appears in a legacy envelope because ':' is outside
//! the base64 alphabet.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{CryptError, CryptResult};

use super::entropy::random_array;
use super::envelope::decode_base64;
use super::key_derivation::{derive_argon2_key, Argon2Params};
use super::SecureBytes;

/// Version marker that starts every authenticated envelope
pub const PREFIX: &str = "v2:";

/// Size of the Argon2 salt in bytes
const SALT_SIZE: usize = 16;

/// Size of the encoded Argon2 costs in bytes
const PARAMS_SIZE: usize = 12;

/// Salt and costs; authenticated but not encrypted
const HEADER_SIZE: usize = SALT_SIZE + PARAMS_SIZE;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

/// Largest memory cost an envelope may ask for, in KiB (1 GiB)
pub const MAX_MEMORY_COST: u32 = 1 << 20;

/// Largest number of passes an envelope may ask for
pub const MAX_TIME_COST: u32 = 64;

/// Largest parallelism an envelope may ask for
pub const MAX_PARALLELISM: u32 = 64;

/// Check whether `text` carries the authenticated version marker
pub fn is_authenticated(text: &str) -> bool {
    text.trim_start().starts_with(PREFIX)
}

/// Encrypt plaintext into a `v2:` envelope that records `params`
pub fn seal(plaintext: &[u8], passphrase: &str, params: &Argon2Params) -> CryptResult<String> {
    check_bounds(params).map_err(CryptError::Config)?;

    let salt: [u8; SALT_SIZE] = random_array()?;
    let nonce_bytes: [u8; NONCE_SIZE] = random_array()?;

    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(&salt);
    header.extend_from_slice(&encode_params(params));

    let key = derive_argon2_key(passphrase, &salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptError::Config(format!("Failed to create cipher: {}", e)))?;

    let payload = Payload {
        msg: plaintext,
        aad: &header,
    };
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), payload)
        .map_err(|_| CryptError::CryptoFailure)?;

    let mut bytes = header;
    bytes.reserve(NONCE_SIZE + ciphertext.len());
    bytes.extend_from_slice(&nonce_bytes);
    bytes.extend_from_slice(&ciphertext);

    Ok(format!("{}{}", PREFIX, STANDARD.encode(bytes)))
}

/// Decrypt a `v2:` envelope using the Argon2 costs stored in its header
///
/// Any authentication failure, whether from a wrong passphrase or a
/// modified envelope, is reported as [`CryptError::CryptoFailure`]. Costs
/// outside the accepted bounds make the envelope malformed.
pub fn open(text: &str, passphrase: &str) -> CryptResult<SecureBytes> {
    let body = text
        .trim()
        .strip_prefix(PREFIX)
        .ok_or_else(|| CryptError::UnsupportedFormat("missing v2 marker".to_string()))?;

    let bytes = decode_base64(body)?;

    let min_len = HEADER_SIZE + NONCE_SIZE + TAG_SIZE;
    if bytes.len() < min_len {
        return Err(CryptError::MalformedEnvelope(format!(
            "decoded length {} is shorter than the {}-byte minimum",
            bytes.len(),
            min_len
        )));
    }

    let (header, rest) = bytes.split_at(HEADER_SIZE);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);
    let (salt, encoded) = header.split_at(SALT_SIZE);

    let params = decode_params(encoded);
    check_bounds(&params).map_err(CryptError::MalformedEnvelope)?;

    let key = derive_argon2_key(passphrase, salt, &params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptError::Config(format!("Failed to create cipher: {}", e)))?;

    let payload = Payload {
        msg: ciphertext,
        aad: header,
    };
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), payload)
        .map_err(|_| CryptError::CryptoFailure)?;

    Ok(SecureBytes::from(plaintext))
}

fn encode_params(params: &Argon2Params) -> [u8; PARAMS_SIZE] {
    let mut out = [0u8; PARAMS_SIZE];
    out[0..4].copy_from_slice(&params.memory_cost.to_be_bytes());
    out[4..8].copy_from_slice(&params.time_cost.to_be_bytes());
    out[8..12].copy_from_slice(&params.parallelism.to_be_bytes());
    out
}

fn decode_params(bytes: &[u8]) -> Argon2Params {
    let word = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Argon2Params {
        memory_cost: word(0),
        time_cost: word(4),
        parallelism: word(8),
    }
}

/// Costs must pass Argon2's own checks and stay within the `MAX_*` caps
fn check_bounds(params: &Argon2Params) -> Result<(), String> {
    if params.memory_cost > MAX_MEMORY_COST
        || params.time_cost > MAX_TIME_COST
        || params.parallelism > MAX_PARALLELISM
    {
        return Err(format!(
            "Argon2 costs m={} t={} p={} exceed the limits m={} t={} p={}",
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            MAX_MEMORY_COST,
            MAX_TIME_COST,
            MAX_PARALLELISM
        ));
    }
    params.validate().map_err(|e| e.to_string())
}
