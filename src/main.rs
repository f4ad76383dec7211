use clap::Parser;
use sealkit::cli::commands;
use sealkit::cli::{load_settings, Cli, Commands};
use sealkit::config::Settings;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Settings are needed before logging is up; report a bad file after.
    let settings = load_settings(&cli);
    let log_level = settings
        .as_ref()
        .map(|s| s.log_level.clone())
        .unwrap_or_else(|_| Settings::default().log_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SEALKIT_LOG").unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            sealkit::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Keygen { kind, format } => commands::keygen::execute(kind, format),
        Commands::Encrypt {
            ref key,
            ref nonce,
            ref text,
        } => commands::symmetric::execute_encrypt(key, nonce.as_deref(), text),
        Commands::Decrypt {
            ref key,
            ref nonce,
            ref ciphertext,
        } => commands::symmetric::execute_decrypt(key, nonce, ciphertext),
        Commands::Agree { ref action } => commands::agree::execute(action),
        Commands::Derive { ref action } => commands::derive::execute(action),
        Commands::Password { ref action } => commands::password::execute(&settings, action),
        Commands::Sign {
            ref private_key,
            ref data,
        } => commands::sign::execute_sign(private_key, data),
        Commands::Verify {
            ref public_key,
            ref signature,
            ref data,
        } => commands::sign::execute_verify(public_key, signature, data),
        Commands::Digest {
            ref algorithm,
            length,
            ref text,
        } => commands::digest::execute_digest(&settings, algorithm.as_deref(), length, text),
        Commands::Hmac {
            ref secret,
            ref verify,
            ref data,
        } => commands::digest::execute_hmac(secret, data, verify.as_deref()),
        Commands::Version => commands::version::execute(),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(kind = %e.kind(), "command failed");
        sealkit::cli::output::error(&e.to_string());
        if let Some(diag) = e.diagnostic() {
            sealkit::cli::output::tip(&format!("{}: {}", diag.kind, diag.message));
            for cause in &diag.causes {
                sealkit::cli::output::tip(cause);
            }
        }
        std::process::exit(1);
    }
}
