use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use envelope_crypt::cli::{handle_crypt_command, CryptCommands};
use envelope_crypt::config::{paths::CryptPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "envelope-crypt",
    author = "Kaylee Beyene",
    version,
    about = "Encrypt and decrypt text with a passphrase",
    long_about = "envelope-crypt turns text into a self-contained base64 envelope \
                  protected by a passphrase, and turns envelopes back into text."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CryptCommands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_env("ENVELOPE_CRYPT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let paths = CryptPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    handle_crypt_command(&paths, &settings, cli.command)?;

    Ok(())
}
