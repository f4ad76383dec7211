//! `sealkit password`: self-contained password tokens.
//!
//! The password is read from `SEALKIT_PASSWORD` or prompted for.

use zeroize::Zeroizing;

use crate::cli::{password_params, prompt_password, PasswordAction};
use crate::config::Settings;
use crate::crypto::{password_decrypt_with_params, password_encrypt_with_params};
use crate::errors::Result;

/// Execute a `password` subcommand.
pub fn execute(settings: &Settings, action: &PasswordAction) -> Result<()> {
    match action {
        PasswordAction::Encrypt { iterations, text } => {
            let params = password_params(settings, *iterations);
            tracing::debug!(iterations = params.iterations, "password encrypt");

            let password = prompt_password(true)?;
            let token = password_encrypt_with_params(&password, text.as_bytes(), &params)?;
            println!("{token}");
            Ok(())
        }
        PasswordAction::Decrypt { iterations, token } => {
            let params = password_params(settings, *iterations);
            tracing::debug!(iterations = params.iterations, "password decrypt");

            let password = prompt_password(false)?;
            let text = Zeroizing::new(password_decrypt_with_params(&password, token, &params)?);
            println!("{}", text.as_str());
            Ok(())
        }
    }
}
