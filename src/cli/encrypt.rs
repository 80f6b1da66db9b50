//! Encryption CLI commands
//!
//! Provides commands for encrypting and decrypting text with a passphrase.

use std::io::Read;

use clap::Subcommand;

use crate::config::{paths::CryptPaths, settings::Settings};
use crate::crypto::{EnvelopeFormat, PassphraseCipher, SecureString};
use crate::error::{CryptError, CryptResult};

/// Encryption commands
#[derive(Subcommand)]
pub enum CryptCommands {
    /// Encrypt text into a base64 envelope
    Encrypt {
        /// Text to encrypt (read from stdin if omitted)
        text: Option<String>,
        /// Envelope format: legacy or authenticated
        #[arg(short, long)]
        format: Option<EnvelopeFormat>,
        /// Read the passphrase from this environment variable
        #[arg(long, value_name = "VAR")]
        passphrase_env: Option<String>,
    },

    /// Decrypt a base64 envelope back to text
    Decrypt {
        /// Envelope to decrypt (read from stdin if omitted)
        envelope: Option<String>,
        /// Read the passphrase from this environment variable
        #[arg(long, value_name = "VAR")]
        passphrase_env: Option<String>,
    },

    /// Show the config file location and active parameters
    Config {
        /// Write the active settings to the config file first
        #[arg(long)]
        init: bool,
    },
}

/// Handle encryption commands
pub fn handle_crypt_command(
    paths: &CryptPaths,
    settings: &Settings,
    cmd: CryptCommands,
) -> CryptResult<()> {
    match cmd {
        CryptCommands::Encrypt {
            text,
            format,
            passphrase_env,
        } => {
            let cipher = PassphraseCipher::new(settings.crypto)?;
            let plaintext = SecureString::new(read_input(text)?);
            let passphrase = match passphrase_env {
                Some(var) => passphrase_from_env(&var)?,
                None => prompt_new_passphrase()?,
            };

            let format = format.unwrap_or(settings.crypto.format);
            let envelope = cipher.encrypt_as(format, &plaintext, &passphrase)?;
            println!("{}", envelope);
            Ok(())
        }
        CryptCommands::Decrypt {
            envelope,
            passphrase_env,
        } => {
            let cipher = PassphraseCipher::new(settings.crypto)?;
            let envelope = read_input(envelope)?;
            let passphrase = match passphrase_env {
                Some(var) => passphrase_from_env(&var)?,
                None => prompt_passphrase("Enter passphrase: ")?,
            };

            let plaintext = SecureString::new(cipher.decrypt(&envelope, &passphrase)?);
            println!("{}", plaintext.as_str());
            Ok(())
        }
        CryptCommands::Config { init } => {
            if init {
                settings.save(paths)?;
                println!("Saved settings to {}", paths.settings_file().display());
                println!();
            }
            show_config(paths, settings)
        }
    }
}

fn show_config(paths: &CryptPaths, settings: &Settings) -> CryptResult<()> {
    let crypto = &settings.crypto;

    println!("envelope-crypt Configuration");
    println!("============================");
    println!("Config file: {}", paths.settings_file().display());
    println!();
    println!("Default format: {}", crypto.format);
    println!();
    println!("Legacy envelopes:");
    println!("  Key derivation: PBKDF2-HMAC-SHA1");
    println!("  Iterations: {}", crypto.kdf.iterations);
    println!("  Key length: {} bytes", crypto.kdf.key_length);
    println!("  Cipher: Rijndael-CBC, {}-byte block", crypto.cipher.block_size);
    println!("  Salt length: {} bytes", crypto.salt_len);
    println!();
    println!("Authenticated envelopes:");
    println!("  Key derivation: Argon2id");
    println!("  Memory Cost: {} KiB", crypto.argon2.memory_cost);
    println!("  Time Cost: {} iterations", crypto.argon2.time_cost);
    println!("  Parallelism: {} threads", crypto.argon2.parallelism);
    println!("  Cipher: AES-256-GCM");

    Ok(())
}

/// Use the argument if given, otherwise read stdin minus one trailing newline
fn read_input(arg: Option<String>) -> CryptResult<String> {
    if let Some(text) = arg {
        return Ok(text);
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| CryptError::Io(format!("Failed to read stdin: {}", e)))?;

    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
    Ok(input)
}

fn passphrase_from_env(var: &str) -> CryptResult<SecureString> {
    std::env::var(var)
        .map(SecureString::new)
        .map_err(|_| CryptError::Config(format!("Environment variable {} is not set", var)))
}

/// Prompt for a new passphrase with confirmation
fn prompt_new_passphrase() -> CryptResult<SecureString> {
    loop {
        let pass1 = prompt_passphrase("Enter passphrase: ")?;
        let pass2 = prompt_passphrase("Confirm passphrase: ")?;

        if pass1 != pass2 {
            eprintln!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(pass1);
    }
}

/// Prompt for a passphrase (hidden input)
fn prompt_passphrase(prompt: &str) -> CryptResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| CryptError::Io(format!("Failed to read passphrase: {}", e)))
}
