//! HKDF-derived envelopes.
//!
//! Like agreement envelopes, but the ECDH shared secret is stretched
//! through HKDF-SHA256 with a fresh random salt, so every message gets
//! its own AES key.  The salt travels next to the nonce and ciphertext.

use aes_gcm::aead::consts::U16;
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::agreement::shared_secret;
use super::diagnostics::diagnose;
use super::encryption::{self, EnvelopeCiphertext, SymmetricKey, KEY_LEN};
use super::engine::engine;
use super::keys::KeyMaterial;
use crate::errors::{Result, SealError};

/// Length of the random HKDF salt in bytes.
pub const SALT_LEN: usize = 16;

/// HKDF-SHA256(shared secret, salt), empty info, 32 bytes.
fn derive_key(private_key: &KeyMaterial, public_key: &KeyMaterial, salt: &[u8]) -> Result<SymmetricKey> {
    let secret = shared_secret(private_key, public_key)?;
    let hk = Hkdf::<Sha256>::new(Some(salt), secret.as_slice());

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(&[], okm.as_mut_slice())
        .map_err(|e| SealError::InvalidParameter(format!("HKDF expand failed: {e}")))?;
    Ok(SymmetricKey::derived(*okm))
}

/// Encrypt under a per-message HKDF key.  The returned envelope carries
/// the salt.
pub fn derived_encrypt(
    private_key: &KeyMaterial,
    public_key: &KeyMaterial,
    plaintext: &[u8],
) -> Result<EnvelopeCiphertext> {
    let salt = engine()?.random_array::<SALT_LEN>()?;
    let key = derive_key(private_key, public_key, &salt)?;

    let mut envelope = encryption::encrypt(&key, plaintext, None)?;
    envelope.salt = Some(salt.to_vec());
    Ok(envelope)
}

/// Decrypt a derived envelope.
///
/// Any salt length is accepted; a wrong salt simply produces the wrong
/// key.  Every failure is returned as `SealError::Decrypt` with its
/// diagnostic attached.
pub fn derived_decrypt(
    private_key: &KeyMaterial,
    public_key: &KeyMaterial,
    salt: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    derive_key(private_key, public_key, salt)
        .and_then(|key| encryption::open::<U16>(&key, nonce, ciphertext))
        .map_err(|e| diagnose("derived decrypt", e))
}
