//! Key-format normalization.
//!
//! Turns [`KeyMaterial`] of unknown encoding into a [`CanonicalKey`] for
//! one key family.  Encoded bytes are tried against each
//! [`KeyEncoding`] in [`KeyEncoding::TRIAL_ORDER`]; the first encoding
//! that imports wins.  Every attempt is a plain fallible function, so a
//! failed attempt simply moves the loop on.
//!
//! Normalization is pure: no caching, no logging, no retries beyond the
//! fixed trial list.

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p256::{PublicKey, SecretKey};

use super::keys::{
    CanonicalKey, KeyEncoding, KeyFamily, KeyMaterial, KeyRepr, KeyRole,
    UNCOMPRESSED_POINT_MARKER,
};
use crate::errors::{Result, SealError};

/// Why a single decode attempt did not produce a key.
type AttemptError = String;

/// Normalize `material` into a canonical key of `family`.
///
/// A canonical key of the same family is returned as-is (same handle).
pub fn normalize(material: &KeyMaterial, family: KeyFamily) -> Result<CanonicalKey> {
    let (bytes, declared_role) = match material {
        KeyMaterial::Canonical(key) if key.family() == family => return Ok(key.clone()),
        KeyMaterial::Canonical(key) => {
            return Err(SealError::InvalidKeyFormat(format!(
                "expected a {} key handle, got a {} key handle",
                family_name(family),
                family_name(key.family())
            )))
        }
        KeyMaterial::Encoded {
            bytes,
            declared_role,
        } => (bytes.as_slice(), *declared_role),
    };

    let mut attempted = Vec::with_capacity(KeyEncoding::TRIAL_ORDER.len());
    for encoding in KeyEncoding::TRIAL_ORDER {
        if declared_role.is_some_and(|role| role != encoding.role()) {
            continue;
        }
        attempted.push(encoding);
        if let Ok(repr) = decode(encoding, bytes, family) {
            return Ok(CanonicalKey::new(
                repr,
                extractable_on_import(encoding),
                Some(encoding),
            ));
        }
    }

    Err(SealError::UnrecognizedKeyFormat { attempted })
}

/// Normalize and require a specific role.
pub(crate) fn normalize_as(
    material: &KeyMaterial,
    family: KeyFamily,
    role: KeyRole,
) -> Result<CanonicalKey> {
    let key = normalize(material, family)?;
    if key.role() != role {
        return Err(SealError::InvalidKeyFormat(format!(
            "expected a {} {} key, got a {} key",
            role_name(role),
            family_name(family),
            role_name(key.role())
        )));
    }
    Ok(key)
}

/// Try to import `bytes` under a single encoding.
fn decode(
    encoding: KeyEncoding,
    bytes: &[u8],
    family: KeyFamily,
) -> std::result::Result<KeyRepr, AttemptError> {
    match encoding {
        KeyEncoding::Spki => decode_spki(bytes, family),
        KeyEncoding::RawPoint => decode_point(bytes, family),
        KeyEncoding::Pkcs8 => decode_pkcs8(bytes, family),
        KeyEncoding::CompactPoint => {
            let mut point = Vec::with_capacity(bytes.len() + 1);
            point.push(UNCOMPRESSED_POINT_MARKER);
            point.extend_from_slice(bytes);
            decode_point(&point, family)
        }
    }
}

fn decode_spki(bytes: &[u8], family: KeyFamily) -> std::result::Result<KeyRepr, AttemptError> {
    match family {
        KeyFamily::Agreement => PublicKey::from_public_key_der(bytes)
            .map(KeyRepr::AgreementPublic)
            .map_err(|e| e.to_string()),
        KeyFamily::Signature => VerifyingKey::from_public_key_der(bytes)
            .map(KeyRepr::Verifying)
            .map_err(|e| e.to_string()),
    }
}

fn decode_point(bytes: &[u8], family: KeyFamily) -> std::result::Result<KeyRepr, AttemptError> {
    match family {
        KeyFamily::Agreement => PublicKey::from_sec1_bytes(bytes)
            .map(KeyRepr::AgreementPublic)
            .map_err(|e| e.to_string()),
        KeyFamily::Signature => VerifyingKey::from_sec1_bytes(bytes)
            .map(KeyRepr::Verifying)
            .map_err(|e| e.to_string()),
    }
}

fn decode_pkcs8(bytes: &[u8], family: KeyFamily) -> std::result::Result<KeyRepr, AttemptError> {
    match family {
        KeyFamily::Agreement => SecretKey::from_pkcs8_der(bytes)
            .map(KeyRepr::AgreementPrivate)
            .map_err(|e| e.to_string()),
        KeyFamily::Signature => SigningKey::from_pkcs8_der(bytes)
            .map(KeyRepr::Signing)
            .map_err(|e| e.to_string()),
    }
}

/// Imported public keys stay exportable; imported private keys do not.
fn extractable_on_import(encoding: KeyEncoding) -> bool {
    encoding.role() == KeyRole::Public
}

fn family_name(family: KeyFamily) -> &'static str {
    match family {
        KeyFamily::Agreement => "agreement",
        KeyFamily::Signature => "signature",
    }
}

fn role_name(role: KeyRole) -> &'static str {
    match role {
        KeyRole::Public => "public",
        KeyRole::Private => "private",
    }
}
