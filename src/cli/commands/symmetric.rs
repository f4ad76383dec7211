//! `sealkit encrypt` / `sealkit decrypt`: AES-256-GCM with a direct key.

use zeroize::Zeroizing;

use crate::cli::print_json;
use crate::crypto::{decrypt_text, encrypt, from_base64, import_key};
use crate::errors::Result;

/// Execute the `encrypt` command.
pub fn execute_encrypt(key: &str, nonce: Option<&str>, text: &str) -> Result<()> {
    let key = import_key(key, false)?;
    let nonce = nonce.map(|n| from_base64("nonce", n)).transpose()?;

    let envelope = encrypt(&key, text.as_bytes(), nonce.as_deref())?;
    print_json(&envelope)
}

/// Execute the `decrypt` command.
pub fn execute_decrypt(key: &str, nonce: &str, ciphertext: &str) -> Result<()> {
    let key = import_key(key, false)?;
    let nonce = from_base64("nonce", nonce)?;
    let ciphertext = from_base64("ciphertext", ciphertext)?;

    let plaintext = Zeroizing::new(decrypt_text(&key, &nonce, &ciphertext)?);
    println!("{}", plaintext.as_str());
    Ok(())
}
