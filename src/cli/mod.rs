//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::keys::{KeyMaterial, KeyRole};
use crate::crypto::password::PasswordParams;
use crate::errors::{Result, SealError};

/// sealkit CLI: envelope encryption, key agreement and signatures.
#[derive(Parser)]
#[command(
    name = "sealkit",
    about = "Envelope encryption, key agreement and signatures over P-256 and AES-GCM",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched for .sealkit.toml (default: current directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a key or key pair
    Keygen {
        /// Kind of key to generate
        #[arg(value_enum)]
        kind: KeyKind,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: KeyFormat,
    },

    /// Encrypt text with a symmetric key
    Encrypt {
        /// Base64 AES-256 key
        #[arg(short, long)]
        key: String,
        /// Base64 16-byte nonce (random if omitted)
        #[arg(long)]
        nonce: Option<String>,
        /// Text to encrypt
        text: String,
    },

    /// Decrypt a symmetric envelope
    Decrypt {
        /// Base64 AES-256 key
        #[arg(short, long)]
        key: String,
        /// Base64 nonce
        #[arg(long)]
        nonce: String,
        /// Base64 ciphertext
        #[arg(long)]
        ciphertext: String,
    },

    /// Encrypt or decrypt with an ECDH-agreed key
    Agree {
        #[command(subcommand)]
        action: AgreeAction,
    },

    /// Encrypt or decrypt with an HKDF-derived ECDH key
    Derive {
        #[command(subcommand)]
        action: DeriveAction,
    },

    /// Encrypt or decrypt with a password token
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },

    /// Sign data with a private signature key
    Sign {
        /// Base64 private key (PKCS8)
        #[arg(long = "private")]
        private_key: String,
        /// Data to sign
        data: String,
    },

    /// Verify a signature
    Verify {
        /// Base64 public key (SPKI, raw or compact point)
        #[arg(long = "public")]
        public_key: String,
        /// Base64 signature
        #[arg(long)]
        signature: String,
        /// Data that was signed
        data: String,
    },

    /// Hash text (SHA-1, SHA-256, SHA-384, SHA-512)
    Digest {
        /// Hash algorithm (default from config: SHA-256)
        #[arg(short, long)]
        algorithm: Option<String>,
        /// Fold the digest into this many bytes
        #[arg(short, long, allow_negative_numbers = true)]
        length: Option<i64>,
        /// Text to hash
        text: String,
    },

    /// HMAC-SHA256 of data, as hex
    Hmac {
        /// HMAC secret
        #[arg(short, long)]
        secret: String,
        /// Check against this hex digest instead of printing one
        #[arg(long)]
        verify: Option<String>,
        /// Data to authenticate
        data: String,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Key kinds for `keygen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyKind {
    /// AES-256 key
    Symmetric,
    /// ECDH P-256 key pair
    Agreement,
    /// ECDSA P-256 key pair
    Signature,
}

/// Output formats for `keygen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyFormat {
    Json,
    Table,
}

/// Agreement subcommands.
#[derive(clap::Subcommand)]
pub enum AgreeAction {
    /// Encrypt for the holder of the public key
    Encrypt {
        /// Your base64 private key (PKCS8)
        #[arg(long = "private")]
        private_key: String,
        /// Their base64 public key
        #[arg(long = "public")]
        public_key: String,
        /// Text to encrypt
        text: String,
    },

    /// Decrypt a message from the holder of the public key
    Decrypt {
        #[arg(long = "private")]
        private_key: String,
        #[arg(long = "public")]
        public_key: String,
        #[arg(long)]
        nonce: String,
        #[arg(long)]
        ciphertext: String,
    },
}

/// Derived-key subcommands.
#[derive(clap::Subcommand)]
pub enum DeriveAction {
    /// Encrypt under a fresh HKDF salt
    Encrypt {
        #[arg(long = "private")]
        private_key: String,
        #[arg(long = "public")]
        public_key: String,
        text: String,
    },

    /// Decrypt a derived envelope
    Decrypt {
        #[arg(long = "private")]
        private_key: String,
        #[arg(long = "public")]
        public_key: String,
        #[arg(long)]
        salt: String,
        #[arg(long)]
        nonce: String,
        #[arg(long)]
        ciphertext: String,
    },
}

/// Password subcommands.
#[derive(clap::Subcommand)]
pub enum PasswordAction {
    /// Encrypt text into a password token
    Encrypt {
        /// Stretch rounds (default from config: 10)
        #[arg(long)]
        iterations: Option<u32>,
        text: String,
    },

    /// Decrypt a password token
    Decrypt {
        /// Stretch rounds the token was made with
        #[arg(long)]
        iterations: Option<u32>,
        token: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config-dir`, or the current directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    Settings::load(&dir)
}

/// Password params from the flag, falling back to settings.
pub fn password_params(settings: &Settings, iterations: Option<u32>) -> PasswordParams {
    match iterations {
        Some(iterations) => PasswordParams { iterations },
        None => settings.password_params(),
    }
}

/// Parse a base64 key argument, tagged with the role the flag expects.
pub fn key_arg(text: &str, role: KeyRole) -> Result<KeyMaterial> {
    let KeyMaterial::Encoded { bytes, .. } = KeyMaterial::from_base64(text)? else {
        return Err(SealError::InvalidKeyFormat("expected encoded key bytes".into()));
    };
    Ok(KeyMaterial::with_role(bytes.to_vec(), role))
}

/// Get the password, trying in order:
/// 1. `SEALKIT_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt (with confirmation when `confirm` is set)
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(confirm: bool) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("SEALKIT_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let mut prompt = dialoguer::Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match, try again");
    }
    let pw = prompt
        .interact()
        .map_err(|e| SealError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SealError::SerializationError(format!("output: {e}")))?;
    println!("{json}");
    Ok(())
}
