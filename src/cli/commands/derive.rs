//! `sealkit derive`: envelopes under an HKDF-derived ECDH key.

use zeroize::Zeroizing;

use crate::cli::{key_arg, print_json, DeriveAction};
use crate::crypto::encryption::into_text;
use crate::crypto::keys::KeyRole;
use crate::crypto::{derived_decrypt, derived_encrypt, from_base64};
use crate::errors::Result;

/// Execute a `derive` subcommand.
pub fn execute(action: &DeriveAction) -> Result<()> {
    match action {
        DeriveAction::Encrypt {
            private_key,
            public_key,
            text,
        } => {
            let private = key_arg(private_key, KeyRole::Private)?;
            let public = key_arg(public_key, KeyRole::Public)?;
            let envelope = derived_encrypt(&private, &public, text.as_bytes())?;
            print_json(&envelope)
        }
        DeriveAction::Decrypt {
            private_key,
            public_key,
            salt,
            nonce,
            ciphertext,
        } => {
            let private = key_arg(private_key, KeyRole::Private)?;
            let public = key_arg(public_key, KeyRole::Public)?;
            let salt = from_base64("salt", salt)?;
            let nonce = from_base64("nonce", nonce)?;
            let ciphertext = from_base64("ciphertext", ciphertext)?;

            let plaintext = derived_decrypt(&private, &public, &salt, &nonce, &ciphertext)?;
            let text = Zeroizing::new(into_text(plaintext)?);
            println!("{}", text.as_str());
            Ok(())
        }
    }
}
