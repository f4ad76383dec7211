//! `sealkit sign` / `sealkit verify`: ECDSA P-256 signatures.

use serde::Serialize;

use crate::cli::{key_arg, print_json};
use crate::crypto::keys::KeyRole;
use crate::crypto::{from_base64, sign, to_base64, verify};
use crate::errors::Result;

#[derive(Debug, Serialize)]
struct Verification {
    valid: bool,
}

/// Execute the `sign` command; prints the base64 signature.
pub fn execute_sign(private_key: &str, data: &str) -> Result<()> {
    let private = key_arg(private_key, KeyRole::Private)?;
    let signature = sign(&private, data.as_bytes())?;
    println!("{}", to_base64(&signature));
    Ok(())
}

/// Execute the `verify` command.
///
/// A bad signature is a result, not an error: `{"valid": false}`.
pub fn execute_verify(public_key: &str, signature: &str, data: &str) -> Result<()> {
    let public = key_arg(public_key, KeyRole::Public)?;
    let signature = from_base64("signature", signature)?;
    let valid = verify(&public, &signature, data.as_bytes())?;
    print_json(&Verification { valid })
}
