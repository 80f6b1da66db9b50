//! Legacy envelope codec
//!
//! Wire format, bit-exact and without a version marker:
//!
//! ```text
//! base64( salt[salt_len] || iv[block_size] || ciphertext[n * block_size] )
//! ```
//!
//! With the default layout that is a 32-byte salt and a 32-byte IV, so any
//! decoded envelope shorter than 64 bytes is rejected before a key is
//! derived.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{CryptError, CryptResult};

/// Byte layout of a legacy envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeLayout {
    pub salt_len: usize,
    pub iv_len: usize,
}

impl Default for EnvelopeLayout {
    fn default() -> Self {
        Self {
            salt_len: 32,
            iv_len: 32,
        }
    }
}

impl EnvelopeLayout {
    /// Header size in bytes; the minimum decoded length of an envelope
    pub fn header_len(&self) -> usize {
        self.salt_len + self.iv_len
    }
}

/// The three parts of a legacy envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn new(salt: &[u8], iv: &[u8], ciphertext: Vec<u8>) -> Self {
        Self {
            salt: salt.to_vec(),
            iv: iv.to_vec(),
            ciphertext,
        }
    }

    /// Concatenate `salt || iv || ciphertext` and base64-encode the result
    pub fn pack(&self) -> String {
        let mut bytes =
            Vec::with_capacity(self.salt.len() + self.iv.len() + self.ciphertext.len());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(bytes)
    }

    /// Decode envelope text and split it according to `layout`
    ///
    /// ASCII whitespace anywhere in the text is ignored, so line-wrapped
    /// envelopes decode. Everything after the header is ciphertext; its
    /// shape is checked by the cipher, not here.
    pub fn unpack(text: &str, layout: &EnvelopeLayout) -> CryptResult<Self> {
        let bytes = decode_base64(text)?;

        if bytes.len() < layout.header_len() {
            return Err(CryptError::MalformedEnvelope(format!(
                "decoded length {} is shorter than the {}-byte header",
                bytes.len(),
                layout.header_len()
            )));
        }

        let (salt, rest) = bytes.split_at(layout.salt_len);
        let (iv, ciphertext) = rest.split_at(layout.iv_len);

        Ok(Self::new(salt, iv, ciphertext.to_vec()))
    }
}

/// Base64-decode `text` after dropping every ASCII whitespace character
pub(crate) fn decode_base64(text: &str) -> CryptResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| CryptError::MalformedEnvelope(format!("invalid base64: {}", e)))
}
