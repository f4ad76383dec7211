//! Key material and canonical key handles.
//!
//! Callers hand sealkit keys in one of several encodings without saying
//! which.  [`KeyMaterial`] is the tagged input: either opaque encoded
//! bytes or a [`CanonicalKey`] that has already been through
//! normalization.  A `CanonicalKey` is a cheap, shareable handle around
//! a validated P-256 key; cloning it clones the pointer, never the key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};
use p256::{PublicKey, SecretKey};
use zeroize::Zeroizing;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{Result, SealError};

/// Leading byte of an uncompressed SEC1 point.
pub const UNCOMPRESSED_POINT_MARKER: u8 = 0x04;

/// Which protocol a key is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// ECDH key agreement.
    Agreement,
    /// ECDSA signatures.
    Signature,
}

/// Public or private half of a key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Public,
    Private,
}

/// Named curve of a canonical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P-256")
    }
}

/// Operations a canonical key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUsage {
    DeriveKey,
    DeriveBits,
    Sign,
    Verify,
}

/// External encodings recognized by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEncoding {
    /// DER SubjectPublicKeyInfo.
    Spki,
    /// SEC1 point, starting with its marker byte.
    RawPoint,
    /// DER PKCS#8 private key.
    Pkcs8,
    /// Uncompressed point stored without its `0x04` marker.
    CompactPoint,
}

impl KeyEncoding {
    /// Order in which the normalizer tries encodings.
    pub const TRIAL_ORDER: [KeyEncoding; 4] = [
        KeyEncoding::Spki,
        KeyEncoding::RawPoint,
        KeyEncoding::Pkcs8,
        KeyEncoding::CompactPoint,
    ];

    /// The role a key recognized under this encoding has.
    pub fn role(self) -> KeyRole {
        match self {
            KeyEncoding::Pkcs8 => KeyRole::Private,
            KeyEncoding::Spki | KeyEncoding::RawPoint | KeyEncoding::CompactPoint => {
                KeyRole::Public
            }
        }
    }
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyEncoding::Spki => "spki",
            KeyEncoding::RawPoint => "raw",
            KeyEncoding::Pkcs8 => "pkcs8",
            KeyEncoding::CompactPoint => "compact-raw",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// KeyMaterial
// ---------------------------------------------------------------------------

/// Key input of unknown encoding, or an already-normalized handle.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Externally supplied bytes; the encoding is discovered by trial.
    Encoded {
        bytes: Zeroizing<Vec<u8>>,
        declared_role: Option<KeyRole>,
    },
    /// A handle produced by normalization or key generation.
    Canonical(CanonicalKey),
}

impl KeyMaterial {
    /// Wrap raw encoded bytes with no role hint.
    pub fn encoded(bytes: impl Into<Vec<u8>>) -> Self {
        KeyMaterial::Encoded {
            bytes: Zeroizing::new(bytes.into()),
            declared_role: None,
        }
    }

    /// Wrap raw encoded bytes that are known to be a public or private key.
    ///
    /// The normalizer only tries encodings of the declared role.
    pub fn with_role(bytes: impl Into<Vec<u8>>, role: KeyRole) -> Self {
        KeyMaterial::Encoded {
            bytes: Zeroizing::new(bytes.into()),
            declared_role: Some(role),
        }
    }

    /// Parse base64 text into encoded key material.
    ///
    /// Text that is not base64 is not key material at all and is
    /// rejected here, before any format detection.
    pub fn from_base64(text: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(text.trim())
            .map_err(|e| SealError::InvalidKeyFormat(format!("key is not valid base64: {e}")))?;
        Ok(Self::encoded(bytes))
    }

    /// Base64 form of encoded material; `None` for canonical handles.
    pub fn to_base64(&self) -> Option<String> {
        match self {
            KeyMaterial::Encoded { bytes, .. } => Some(BASE64.encode(bytes.as_slice())),
            KeyMaterial::Canonical(_) => None,
        }
    }

    /// The canonical handle, if this material already is one.
    pub fn as_canonical(&self) -> Option<&CanonicalKey> {
        match self {
            KeyMaterial::Canonical(key) => Some(key),
            KeyMaterial::Encoded { .. } => None,
        }
    }
}

impl FromStr for KeyMaterial {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_base64(s)
    }
}

impl From<CanonicalKey> for KeyMaterial {
    fn from(key: CanonicalKey) -> Self {
        KeyMaterial::Canonical(key)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Encoded {
                bytes,
                declared_role,
            } => f
                .debug_struct("Encoded")
                .field("len", &bytes.len())
                .field("declared_role", declared_role)
                .finish(),
            KeyMaterial::Canonical(key) => f.debug_tuple("Canonical").field(key).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// CanonicalKey
// ---------------------------------------------------------------------------

/// Engine-owned key representation.
pub(crate) enum KeyRepr {
    AgreementPublic(PublicKey),
    AgreementPrivate(SecretKey),
    Verifying(VerifyingKey),
    Signing(SigningKey),
}

struct KeyHandle {
    extractable: bool,
    source: Option<KeyEncoding>,
    repr: KeyRepr,
}

/// A validated, engine-native key.
#[derive(Clone)]
pub struct CanonicalKey {
    inner: Arc<KeyHandle>,
}

impl CanonicalKey {
    pub(crate) fn new(repr: KeyRepr, extractable: bool, source: Option<KeyEncoding>) -> Self {
        Self {
            inner: Arc::new(KeyHandle {
                extractable,
                source,
                repr,
            }),
        }
    }

    pub(crate) fn repr(&self) -> &KeyRepr {
        &self.inner.repr
    }

    pub fn family(&self) -> KeyFamily {
        match self.inner.repr {
            KeyRepr::AgreementPublic(_) | KeyRepr::AgreementPrivate(_) => KeyFamily::Agreement,
            KeyRepr::Verifying(_) | KeyRepr::Signing(_) => KeyFamily::Signature,
        }
    }

    pub fn role(&self) -> KeyRole {
        match self.inner.repr {
            KeyRepr::AgreementPublic(_) | KeyRepr::Verifying(_) => KeyRole::Public,
            KeyRepr::AgreementPrivate(_) | KeyRepr::Signing(_) => KeyRole::Private,
        }
    }

    pub fn curve(&self) -> Curve {
        Curve::P256
    }

    pub fn is_extractable(&self) -> bool {
        self.inner.extractable
    }

    /// Encoding this key was recognized from; `None` for generated keys.
    pub fn source_encoding(&self) -> Option<KeyEncoding> {
        self.inner.source
    }

    /// Operations this key may perform.
    pub fn usages(&self) -> &'static [KeyUsage] {
        match self.inner.repr {
            KeyRepr::AgreementPublic(_) => &[],
            KeyRepr::AgreementPrivate(_) => &[KeyUsage::DeriveKey, KeyUsage::DeriveBits],
            KeyRepr::Verifying(_) => &[KeyUsage::Verify],
            KeyRepr::Signing(_) => &[KeyUsage::Sign],
        }
    }

    pub fn allows(&self, usage: KeyUsage) -> bool {
        self.usages().contains(&usage)
    }

    /// True when both values are the same handle, not merely equal keys.
    pub fn same_handle(&self, other: &CanonicalKey) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// DER SubjectPublicKeyInfo of a public key.
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let doc = match self.repr() {
            KeyRepr::AgreementPublic(key) => key.to_public_key_der(),
            KeyRepr::Verifying(key) => key.to_public_key_der(),
            _ => return Err(not_public("SPKI")),
        }
        .map_err(|e| SealError::InvalidParameter(format!("SPKI export failed: {e}")))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// SEC1 uncompressed point (65 bytes), or the 64-byte form without
    /// the marker byte when `compact` is set.
    pub fn to_raw_point(&self, compact: bool) -> Result<Vec<u8>> {
        let point = match self.repr() {
            KeyRepr::AgreementPublic(key) => key.to_encoded_point(false),
            KeyRepr::Verifying(key) => key.to_encoded_point(false),
            _ => return Err(not_public("raw point")),
        };
        let bytes = point.as_bytes();
        Ok(if compact {
            bytes[1..].to_vec()
        } else {
            bytes.to_vec()
        })
    }

    /// DER PKCS#8 of an extractable private key.
    pub fn to_pkcs8_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        if !self.is_extractable() {
            return Err(SealError::InvalidParameter(
                "key is not extractable".into(),
            ));
        }
        let doc = match self.repr() {
            KeyRepr::AgreementPrivate(key) => key.to_pkcs8_der(),
            KeyRepr::Signing(key) => key.to_pkcs8_der(),
            _ => {
                return Err(SealError::InvalidParameter(
                    "PKCS8 export requires a private key".into(),
                ))
            }
        }
        .map_err(|e| SealError::InvalidParameter(format!("PKCS8 export failed: {e}")))?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }
}

fn not_public(what: &str) -> SealError {
    SealError::InvalidParameter(format!("{what} export requires a public key"))
}

impl fmt::Debug for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalKey")
            .field("family", &self.family())
            .field("curve", &self.curve())
            .field("role", &self.role())
            .field("extractable", &self.is_extractable())
            .field("usages", &self.usages())
            .field("source", &self.source_encoding())
            .finish()
    }
}
