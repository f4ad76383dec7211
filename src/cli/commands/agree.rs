//! `sealkit agree`: envelopes under a raw ECDH shared key.

use zeroize::Zeroizing;

use crate::cli::{key_arg, print_json, AgreeAction};
use crate::crypto::encryption::into_text;
use crate::crypto::keys::KeyRole;
use crate::crypto::{agreement_decrypt, agreement_encrypt, from_base64};
use crate::errors::Result;

/// Execute an `agree` subcommand.
pub fn execute(action: &AgreeAction) -> Result<()> {
    match action {
        AgreeAction::Encrypt {
            private_key,
            public_key,
            text,
        } => {
            let private = key_arg(private_key, KeyRole::Private)?;
            let public = key_arg(public_key, KeyRole::Public)?;
            let envelope = agreement_encrypt(&private, &public, text.as_bytes())?;
            print_json(&envelope)
        }
        AgreeAction::Decrypt {
            private_key,
            public_key,
            nonce,
            ciphertext,
        } => {
            let private = key_arg(private_key, KeyRole::Private)?;
            let public = key_arg(public_key, KeyRole::Public)?;
            let nonce = from_base64("nonce", nonce)?;
            let ciphertext = from_base64("ciphertext", ciphertext)?;

            let plaintext = agreement_decrypt(&private, &public, &nonce, &ciphertext)?;
            let text = Zeroizing::new(into_text(plaintext)?);
            println!("{}", text.as_str());
            Ok(())
        }
    }
}
