//! AES-256-GCM authenticated encryption.
//!
//! Envelopes use a 16-byte nonce (GCM derives the counter block from it
//! with GHASH).  Each call to `encrypt` draws a fresh random nonce unless
//! the caller supplies one, and returns it next to the ciphertext:
//!
//! ```text
//! EnvelopeCiphertext { ciphertext: ciphertext || 16-byte tag, nonce: 16 bytes }
//! ```
//!
//! The generic `seal` / `open` helpers are shared with the password
//! envelope, which uses a longer, password-derived nonce.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::{ArrayLength, GenericArray};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::diagnostics::diagnose;
use super::encoding::{
    base64_decode, base64_decode_opt, base64_encode, base64_encode_opt, from_base64, to_base64,
};
use super::engine::engine;
use crate::errors::{Result, SealError};

/// Size of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Size of an envelope nonce in bytes.
pub const NONCE_LEN: usize = 16;

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

// ---------------------------------------------------------------------------
// SymmetricKey
// ---------------------------------------------------------------------------

/// A 256-bit AES key that is wiped from memory on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_LEN],
    #[zeroize(skip)]
    exportable: bool,
}

impl SymmetricKey {
    /// Key derived inside an envelope; it can never be exported.
    pub(crate) fn derived(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes,
            exportable: false,
        }
    }

    pub fn is_exportable(&self) -> bool {
        self.exportable
    }

    /// Export the raw key as base64.
    pub fn export(&self) -> Result<String> {
        if !self.exportable {
            return Err(SealError::InvalidParameter(
                "symmetric key is not exportable".into(),
            ));
        }
        Ok(to_base64(&self.bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("exportable", &self.exportable)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh random AES-256 key.
pub fn make_key(exportable: bool) -> Result<SymmetricKey> {
    let bytes = engine()?.random_array::<KEY_LEN>()?;
    Ok(SymmetricKey { bytes, exportable })
}

/// Import a base64 raw AES-256 key.
pub fn import_key(encoded: &str, exportable: bool) -> Result<SymmetricKey> {
    let raw = Zeroizing::new(
        from_base64("symmetric key", encoded)
            .map_err(|e| SealError::InvalidKeyFormat(e.to_string()))?,
    );
    let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
        SealError::InvalidKeyFormat(format!(
            "symmetric key must be {KEY_LEN} bytes, got {}",
            raw.len()
        ))
    })?;
    Ok(SymmetricKey { bytes, exportable })
}

// ---------------------------------------------------------------------------
// EnvelopeCiphertext
// ---------------------------------------------------------------------------

/// Ciphertext plus everything (other than the key) needed to open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeCiphertext {
    /// Ciphertext with the GCM tag appended.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,

    /// HKDF salt; only present on derived-key envelopes.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "base64_encode_opt",
        deserialize_with = "base64_decode_opt"
    )]
    pub salt: Option<Vec<u8>>,
}

impl EnvelopeCiphertext {
    /// Rebuild an envelope from its base64 fields.
    pub fn from_base64_parts(ciphertext: &str, nonce: &str, salt: Option<&str>) -> Result<Self> {
        Ok(Self {
            ciphertext: from_base64("ciphertext", ciphertext)?,
            nonce: from_base64("nonce", nonce)?,
            salt: salt.map(|s| from_base64("salt", s)).transpose()?,
        })
    }

    pub fn ciphertext_base64(&self) -> String {
        to_base64(&self.ciphertext)
    }

    pub fn nonce_base64(&self) -> String {
        to_base64(&self.nonce)
    }

    pub fn salt_base64(&self) -> Option<String> {
        self.salt.as_deref().map(to_base64)
    }
}

// ---------------------------------------------------------------------------
// Direct symmetric encryption
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` under `key`.
///
/// With `nonce = None` a random 16-byte nonce is generated.  A supplied
/// nonce must be exactly 16 bytes; reusing one with the same key breaks
/// GCM, so only pass one when the caller manages uniqueness.
pub fn encrypt(
    key: &SymmetricKey,
    plaintext: &[u8],
    nonce: Option<&[u8]>,
) -> Result<EnvelopeCiphertext> {
    let nonce = match nonce {
        Some(n) if n.len() == NONCE_LEN => n.to_vec(),
        Some(n) => {
            return Err(SealError::InvalidParameter(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                n.len()
            )))
        }
        None => engine()?.random_array::<NONCE_LEN>()?.to_vec(),
    };

    let ciphertext = seal::<U16>(key, &nonce, plaintext)?;
    Ok(EnvelopeCiphertext {
        ciphertext,
        nonce,
        salt: None,
    })
}

/// Decrypt and authenticate `ciphertext`.
pub fn decrypt(key: &SymmetricKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    open::<U16>(key, nonce, ciphertext).map_err(|e| diagnose("decrypt", e))
}

/// Decrypt and return the plaintext as UTF-8 text.
pub fn decrypt_text(key: &SymmetricKey, nonce: &[u8], ciphertext: &[u8]) -> Result<String> {
    into_text(decrypt(key, nonce, ciphertext)?)
}

/// Interpret decrypted bytes as UTF-8.
pub fn into_text(plaintext: Vec<u8>) -> Result<String> {
    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        SealError::MalformedEnvelope("plaintext is not valid UTF-8".into())
    })
}

// ---------------------------------------------------------------------------
// Shared AES-GCM core
// ---------------------------------------------------------------------------

/// AES-256-GCM encrypt with an `N`-byte nonce.
pub(crate) fn seal<N>(key: &SymmetricKey, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    N: ArrayLength<u8>,
{
    if nonce.len() != N::USIZE {
        return Err(SealError::InvalidParameter(format!(
            "nonce must be {} bytes, got {}",
            N::USIZE,
            nonce.len()
        )));
    }

    let cipher = AesGcm::<Aes256, N>::new_from_slice(key.as_bytes())
        .map_err(|e| SealError::InvalidParameter(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|e| SealError::InvalidParameter(format!("encryption error: {e}")))
}

/// AES-256-GCM decrypt with an `N`-byte nonce.
///
/// A nonce of the wrong length can never authenticate, so it is reported
/// as an authentication failure like a bad tag.
pub(crate) fn open<N>(key: &SymmetricKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    N: ArrayLength<u8>,
{
    if nonce.len() != N::USIZE {
        return Err(SealError::AeadAuthenticationFailure(format!(
            "nonce must be {} bytes, got {}",
            N::USIZE,
            nonce.len()
        )));
    }

    let cipher = AesGcm::<Aes256, N>::new_from_slice(key.as_bytes())
        .map_err(|e| SealError::InvalidParameter(format!("invalid key length: {e}")))?;

    cipher
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| {
            SealError::AeadAuthenticationFailure(
                "tag mismatch: wrong key, wrong nonce or corrupted ciphertext".into(),
            )
        })
}
