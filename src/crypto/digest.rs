//! Hashes and keyed digests.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use super::encoding::to_base64;
use crate::errors::{Result, SealError};

/// Supported hash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Digest size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        };
        f.write_str(name)
    }
}

impl FromStr for HashAlgorithm {
    type Err = SealError;

    /// Accepts `SHA-256`, `sha256`, `Sha-256` and so on.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "");
        Self::ALL
            .into_iter()
            .find(|alg| alg.to_string().replace('-', "") == wanted)
            .ok_or_else(|| {
                SealError::InvalidParameter(format!(
                    "unknown hash algorithm '{s}' (expected SHA-1, SHA-256, SHA-384 or SHA-512)"
                ))
            })
    }
}

/// Hash `text` and return base64.
///
/// With `length = Some(l)` the digest is folded into `l` bytes: every
/// position `i` in `0..max(l, n)` XORs digest byte `i % n` into output
/// byte `i % l`.  Shorter outputs mix all digest bytes; longer outputs
/// repeat the digest.  A length that cannot be allocated is an
/// `InvalidParameter`.
pub fn digest(algorithm: HashAlgorithm, text: &str, length: Option<usize>) -> Result<String> {
    let hash = algorithm.hash(text.as_bytes());

    let Some(len) = length else {
        return Ok(to_base64(&hash));
    };
    if len == 0 {
        return Err(SealError::InvalidParameter(
            "digest length must be greater than 0".into(),
        ));
    }

    let mut out = Vec::new();
    out.try_reserve_exact(len).map_err(|e| {
        SealError::InvalidParameter(format!("digest length {len} cannot be allocated: {e}"))
    })?;
    out.resize(len, 0u8);
    for i in 0..len.max(hash.len()) {
        out[i % len] ^= hash[i % hash.len()];
    }
    Ok(to_base64(&out))
}

/// HMAC-SHA256 of `data` under `secret`, as lowercase hex.
pub fn keyed_digest(secret: &[u8], data: &[u8]) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| SealError::InvalidParameter(format!("HMAC init failed: {e}")))?;
    mac.update(data);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a hex HMAC-SHA256 in constant time.
pub fn verify_keyed_digest(secret: &[u8], data: &[u8], expected_hex: &str) -> Result<bool> {
    let actual = keyed_digest(secret, data)?;
    let expected = expected_hex.trim().to_ascii_lowercase();
    Ok(actual.as_bytes().ct_eq(expected.as_bytes()).into())
}
