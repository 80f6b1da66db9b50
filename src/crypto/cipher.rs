//! Passphrase encryption of text
//!
//! [`PassphraseCipher`] ties the pieces together:
//!
//! - encrypt: entropy -> key derivation -> cipher -> envelope
//! - decrypt: envelope -> key derivation -> cipher -> UTF-8
//!
//! Each call allocates its own salt, IV, key and buffers, so one instance
//! can be shared freely between threads.

use serde::{Deserialize, Serialize};

use crate::config::CryptoConfig;
use crate::error::{CryptError, CryptResult};

use super::authenticated;
use super::cbc::{cipher_encrypt, decrypt_unchecked};
use super::entropy::generate_random_bytes;
use super::envelope::{Envelope, EnvelopeLayout};
use super::key_derivation::derive_key;
use super::SecureBytes;

/// Output format for new envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeFormat {
    /// Unversioned `salt || iv || ciphertext` with Rijndael-256-CBC
    #[default]
    Legacy,
    /// `v2:` envelope with AES-256-GCM and Argon2id
    Authenticated,
}

impl std::fmt::Display for EnvelopeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

impl std::str::FromStr for EnvelopeFormat {
    type Err = CryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" | "v1" => Ok(Self::Legacy),
            "authenticated" | "v2" => Ok(Self::Authenticated),
            other => Err(CryptError::Config(format!(
                "Unknown envelope format: {}",
                other
            ))),
        }
    }
}

/// Encrypts and decrypts text under a passphrase with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct PassphraseCipher {
    config: CryptoConfig,
}

impl PassphraseCipher {
    /// Create a cipher after validating the configuration
    pub fn new(config: CryptoConfig) -> CryptResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    /// Encrypt in the configured output format
    pub fn encrypt(&self, plaintext: &str, passphrase: &str) -> CryptResult<String> {
        self.encrypt_as(self.config.format, plaintext, passphrase)
    }

    /// Encrypt in an explicit output format
    pub fn encrypt_as(
        &self,
        format: EnvelopeFormat,
        plaintext: &str,
        passphrase: &str,
    ) -> CryptResult<String> {
        tracing::debug!(%format, plaintext_len = plaintext.len(), "encrypting");
        match format {
            EnvelopeFormat::Legacy => self.encrypt_legacy(plaintext, passphrase),
            EnvelopeFormat::Authenticated => {
                authenticated::seal(plaintext.as_bytes(), passphrase, &self.config.argon2)
            }
        }
    }

    /// Decrypt an envelope of either format
    ///
    /// `v2:` envelopes are opened as authenticated; anything else with a
    /// `vN:` marker is rejected; everything else is treated as legacy.
    pub fn decrypt(&self, envelope: &str, passphrase: &str) -> CryptResult<String> {
        let text = envelope.trim();

        let plaintext = if authenticated::is_authenticated(text) {
            tracing::debug!(format = "authenticated", "decrypting");
            let bytes = authenticated::open(text, passphrase)?;
            utf8_text(&bytes)?
        } else if let Some((marker, _)) = text.split_once(':') {
            return Err(CryptError::UnsupportedFormat(marker.to_string()));
        } else {
            tracing::debug!(format = "legacy", "decrypting");
            self.decrypt_legacy(text, passphrase)?
        };

        Ok(plaintext)
    }

    fn layout(&self) -> EnvelopeLayout {
        EnvelopeLayout {
            salt_len: self.config.salt_len,
            iv_len: self.config.cipher.block_size,
        }
    }

    fn encrypt_legacy(&self, plaintext: &str, passphrase: &str) -> CryptResult<String> {
        let layout = self.layout();
        let salt = generate_random_bytes(layout.salt_len)?;
        let iv = generate_random_bytes(layout.iv_len)?;

        tracing::trace!(iterations = self.config.kdf.iterations, "deriving key");
        let key = derive_key(passphrase, &salt, &self.config.kdf)?;

        let ciphertext = cipher_encrypt(
            plaintext.as_bytes(),
            key.as_bytes(),
            &iv,
            &self.config.cipher,
        )?;

        Ok(Envelope::new(&salt, &iv, ciphertext).pack())
    }

    fn decrypt_legacy(&self, text: &str, passphrase: &str) -> CryptResult<String> {
        let envelope = Envelope::unpack(text, &self.layout())?;
        tracing::trace!(
            ciphertext_len = envelope.ciphertext.len(),
            iterations = self.config.kdf.iterations,
            "deriving key"
        );

        let key = derive_key(passphrase, &envelope.salt, &self.config.kdf)?;
        let (bytes, padding_ok) = decrypt_unchecked(
            &envelope.ciphertext,
            key.as_bytes(),
            &envelope.iv,
            &self.config.cipher,
        )?;

        // The UTF-8 check runs even when the padding was bad.
        let text = utf8_text(&bytes);
        if !padding_ok {
            return Err(CryptError::CryptoFailure);
        }
        text
    }
}

fn utf8_text(bytes: &SecureBytes) -> CryptResult<String> {
    std::str::from_utf8(bytes.as_bytes())
        .map(str::to_owned)
        .map_err(|_| CryptError::Encoding)
}

/// Encrypt `plaintext` with the default configuration (legacy format)
pub fn encrypt(plaintext: &str, passphrase: &str) -> CryptResult<String> {
    PassphraseCipher::default().encrypt(plaintext, passphrase)
}

/// Decrypt an envelope with the default configuration
pub fn decrypt(envelope: &str, passphrase: &str) -> CryptResult<String> {
    PassphraseCipher::default().decrypt(envelope, passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::Argon2Params;
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn fast_authenticated() -> PassphraseCipher {
        let config = CryptoConfig {
            argon2: Argon2Params {
                memory_cost: 1024,
                time_cost: 1,
                parallelism: 1,
            },
            format: EnvelopeFormat::Authenticated,
            ..Default::default()
        };
        PassphraseCipher::new(config).unwrap()
    }

    #[test]
    fn test_hello_world_scenario() {
        let envelope = encrypt("hello world", "secret").unwrap();
        assert_eq!(STANDARD.decode(&envelope).unwrap().len(), 96);

        assert_eq!(decrypt(&envelope, "secret").unwrap(), "hello world");
        assert!(decrypt(&envelope, "wrong").is_err());
    }

    #[test]
    fn test_fixed_legacy_envelope_decrypts() {
        // salt = 00..1f, iv = 20..3f, passphrase "correct horse"
        let envelope = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEy\
                        MzQ1Njc4OTo7PD0+P4JsZ4uzgUxNEVMZSvi0PeizQ3g0SZ2Uv8i9zXGx4bIi";
        assert_eq!(decrypt(envelope, "correct horse").unwrap(), "hello world");
        assert_ne!(
            decrypt(envelope, "correct horsE").ok().as_deref(),
            Some("hello world")
        );
    }

    #[test]
    fn test_round_trip_varied_text() {
        let samples = [
            "",
            "a",
            "exactly thirty-two bytes long!!!",
            "Grüße, 世界 🌍",
            "line one\nline two\ttabbed",
        ];
        for sample in samples {
            let envelope = encrypt(sample, "k").unwrap();
            assert_eq!(decrypt(&envelope, "k").unwrap(), sample);
        }
    }

    #[test]
    fn test_empty_plaintext() {
        let envelope = encrypt("", "k").unwrap();
        assert_eq!(STANDARD.decode(&envelope).unwrap().len(), 96);
        assert_eq!(decrypt(&envelope, "k").unwrap(), "");
    }

    #[test]
    fn test_empty_passphrase() {
        let envelope = encrypt("text", "").unwrap();
        assert_eq!(decrypt(&envelope, "").unwrap(), "text");
    }

    #[test]
    fn test_encryption_is_randomized() {
        let a = encrypt("same text", "k").unwrap();
        let b = encrypt("same text", "k").unwrap();
        assert_ne!(a, b);

        let a_bytes = STANDARD.decode(&a).unwrap();
        let b_bytes = STANDARD.decode(&b).unwrap();
        assert_ne!(a_bytes[..32], b_bytes[..32]);
        assert_ne!(a_bytes[32..64], b_bytes[32..64]);

        assert_eq!(decrypt(&a, "k").unwrap(), "same text");
        assert_eq!(decrypt(&b, "k").unwrap(), "same text");
    }

    #[test]
    fn test_envelope_structure() {
        for len in [0, 1, 31, 32, 33, 100] {
            let text = "x".repeat(len);
            let bytes = STANDARD.decode(encrypt(&text, "k").unwrap()).unwrap();
            let ciphertext_len = bytes.len() - 64;
            assert!(ciphertext_len > 0);
            assert_eq!(ciphertext_len % 32, 0);
            assert_eq!(ciphertext_len, (len / 32 + 1) * 32);
        }
    }

    #[test]
    fn test_wrong_passphrase_is_decryption_failure() {
        let envelope = encrypt("a longer secret message to protect", "right").unwrap();
        for wrong in ["wrong", "Right", "right ", ""] {
            match decrypt(&envelope, wrong) {
                Err(e) => assert!(e.is_decryption_failure(), "unexpected error: {:?}", e),
                Ok(text) => assert_ne!(text, "a longer secret message to protect"),
            }
        }
    }

    #[test]
    fn test_short_envelopes_are_malformed() {
        assert!(decrypt("", "k").unwrap_err().is_malformed());

        let short = STANDARD.encode([0u8; 63]);
        assert!(decrypt(&short, "k").unwrap_err().is_malformed());

        assert!(decrypt("%%%", "k").unwrap_err().is_malformed());
    }

    #[test]
    fn test_header_without_ciphertext_fails() {
        let header_only = STANDARD.encode([0u8; 64]);
        let err = decrypt(&header_only, "k").unwrap_err();
        assert!(matches!(err, CryptError::CryptoFailure));
    }

    #[test]
    fn test_invalid_utf8_reported_as_encoding() {
        let cipher = PassphraseCipher::default();
        let layout = cipher.layout();
        let salt = [5u8; 32];
        let iv = [6u8; 32];

        let key = derive_key("k", &salt, &cipher.config().kdf).unwrap();
        let ciphertext =
            cipher_encrypt(&[0xff, 0xfe, 0xfd], key.as_bytes(), &iv, &cipher.config().cipher)
                .unwrap();
        let text = Envelope::new(&salt, &iv, ciphertext).pack();

        assert_eq!(layout.header_len(), 64);
        assert!(matches!(decrypt(&text, "k"), Err(CryptError::Encoding)));
    }

    #[test]
    fn test_authenticated_format() {
        let cipher = fast_authenticated();
        let envelope = cipher.encrypt("hello world", "secret").unwrap();
        assert!(envelope.starts_with("v2:"));

        assert_eq!(cipher.decrypt(&envelope, "secret").unwrap(), "hello world");
        assert!(cipher
            .decrypt(&envelope, "wrong")
            .unwrap_err()
            .is_decryption_failure());
    }

    #[test]
    fn test_decrypt_accepts_both_formats() {
        let cipher = fast_authenticated();
        let legacy = cipher
            .encrypt_as(EnvelopeFormat::Legacy, "old", "k")
            .unwrap();
        let sealed = cipher.encrypt("new", "k").unwrap();

        assert_eq!(cipher.decrypt(&legacy, "k").unwrap(), "old");
        assert_eq!(cipher.decrypt(&sealed, "k").unwrap(), "new");
    }

    #[test]
    fn test_authenticated_ignores_reader_argon2_settings() {
        let writer = fast_authenticated();
        let envelope = writer.encrypt("tuned", "k").unwrap();

        let reader = PassphraseCipher::new(CryptoConfig {
            argon2: Argon2Params {
                memory_cost: 2048,
                time_cost: 2,
                parallelism: 2,
            },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(reader.decrypt(&envelope, "k").unwrap(), "tuned");
        assert_eq!(decrypt(&envelope, "k").unwrap(), "tuned");
    }

    #[test]
    fn test_unknown_version_rejected() {
        let err = decrypt("v9:AAAA", "k").unwrap_err();
        assert!(matches!(err, CryptError::UnsupportedFormat(ref v) if v == "v9"));
    }

    #[test]
    fn test_custom_iterations_must_match() {
        let strong = PassphraseCipher::new(CryptoConfig {
            kdf: crate::crypto::KdfParams {
                iterations: 2000,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();

        let envelope = strong.encrypt("tuned", "k").unwrap();
        assert_eq!(strong.decrypt(&envelope, "k").unwrap(), "tuned");
        assert!(decrypt(&envelope, "k").is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CryptoConfig {
            salt_len: 4,
            ..Default::default()
        };
        assert!(matches!(
            PassphraseCipher::new(config),
            Err(CryptError::Config(_))
        ));
    }

    #[test]
    fn test_concurrent_use() {
        let cipher = std::sync::Arc::new(PassphraseCipher::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cipher = cipher.clone();
                std::thread::spawn(move || {
                    let text = format!("message {}", i);
                    let envelope = cipher.encrypt(&text, "shared").unwrap();
                    assert_eq!(cipher.decrypt(&envelope, "shared").unwrap(), text);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_format_parse_and_display() {
        assert_eq!("legacy".parse::<EnvelopeFormat>().unwrap(), EnvelopeFormat::Legacy);
        assert_eq!(
            "AUTHENTICATED".parse::<EnvelopeFormat>().unwrap(),
            EnvelopeFormat::Authenticated
        );
        assert!("rot13".parse::<EnvelopeFormat>().is_err());
        assert_eq!(EnvelopeFormat::Authenticated.to_string(), "authenticated");
    }
}
