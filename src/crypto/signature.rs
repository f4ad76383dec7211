//! ECDSA P-256 / SHA-256 signatures.
//!
//! Signatures are the fixed 64-byte `r || s` form.  Signing draws a
//! random nonce, so signing the same data twice gives two different,
//! equally valid signatures.

use p256::ecdsa::signature::{RandomizedSigner, Verifier};
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};

use super::encoding::to_base64;
use super::engine::engine;
use super::keys::{CanonicalKey, KeyFamily, KeyMaterial, KeyRepr, KeyRole};
use super::normalize::normalize_as;
use crate::errors::{Result, SealError};

/// Length of an `r || s` signature.
pub const SIGNATURE_LEN: usize = 64;

/// A freshly generated signature key pair.
#[derive(Debug, Clone)]
pub struct SignatureKeyPair {
    /// SPKI, base64.
    pub public_key: String,
    /// PKCS8 bytes when exportable, otherwise a canonical handle.
    pub private_key: KeyMaterial,
}

pub fn make_signature_key_pair(exportable: bool) -> Result<SignatureKeyPair> {
    let signing = SigningKey::random(&mut engine()?.rng());
    let spki = signing
        .verifying_key()
        .to_public_key_der()
        .map_err(|e| SealError::InvalidParameter(format!("SPKI export failed: {e}")))?;

    let private_key = if exportable {
        let pkcs8 = signing
            .to_pkcs8_der()
            .map_err(|e| SealError::InvalidParameter(format!("PKCS8 export failed: {e}")))?;
        KeyMaterial::with_role(pkcs8.as_bytes().to_vec(), KeyRole::Private)
    } else {
        KeyMaterial::Canonical(CanonicalKey::new(KeyRepr::Signing(signing), false, None))
    };

    Ok(SignatureKeyPair {
        public_key: to_base64(spki.as_bytes()),
        private_key,
    })
}

/// Sign `data` with a private signature key.
pub fn sign(private_key: &KeyMaterial, data: &[u8]) -> Result<Vec<u8>> {
    let key = normalize_as(private_key, KeyFamily::Signature, KeyRole::Private)?;
    let KeyRepr::Signing(signing) = key.repr() else {
        return Err(SealError::InvalidKeyFormat(
            "signing needs a private signature key".into(),
        ));
    };

    let signature: Signature = signing
        .try_sign_with_rng(&mut engine()?.rng(), data)
        .map_err(|e| SealError::InvalidParameter(format!("signing failed: {e}")))?;
    Ok(signature.to_bytes().to_vec())
}

/// Check `signature` over `data`.
///
/// Any mismatch, including a signature of the wrong length or one that
/// is not a valid scalar pair, is `Ok(false)`.  Only key problems are
/// errors.
pub fn verify(public_key: &KeyMaterial, signature: &[u8], data: &[u8]) -> Result<bool> {
    let key = normalize_as(public_key, KeyFamily::Signature, KeyRole::Public)?;
    let KeyRepr::Verifying(verifying) = key.repr() else {
        return Err(SealError::InvalidKeyFormat(
            "verification needs a public signature key".into(),
        ));
    };

    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(verifying.verify(data, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn public_of(pair: &SignatureKeyPair) -> KeyMaterial {
        pair.public_key.parse().unwrap()
    }

    #[test]
    fn sign_and_verify() {
        let pair = make_signature_key_pair(true).unwrap();
        let sig = sign(&pair.private_key, b"release v1.2").unwrap();
        assert_eq!(sig.len(), SIGNATURE_LEN);
        assert!(verify(&public_of(&pair), &sig, b"release v1.2").unwrap());
    }

    #[test]
    fn signatures_are_randomized() {
        let pair = make_signature_key_pair(true).unwrap();
        let a = sign(&pair.private_key, b"same").unwrap();
        let b = sign(&pair.private_key, b"same").unwrap();
        assert_ne!(a, b);
        assert!(verify(&public_of(&pair), &a, b"same").unwrap());
        assert!(verify(&public_of(&pair), &b, b"same").unwrap());
    }

    #[test]
    fn mismatches_are_false_not_errors() {
        let pair = make_signature_key_pair(true).unwrap();
        let other = make_signature_key_pair(true).unwrap();
        let sig = sign(&pair.private_key, b"data").unwrap();
        let public = public_of(&pair);

        assert!(!verify(&public, &sig, b"datA").unwrap());
        assert!(!verify(&public_of(&other), &sig, b"data").unwrap());
        assert!(!verify(&public, &[0u8; SIGNATURE_LEN], b"data").unwrap());
        assert!(!verify(&public, &sig[..10], b"data").unwrap());
    }

    #[test]
    fn non_exportable_handle_signs() {
        let pair = make_signature_key_pair(false).unwrap();
        assert!(pair.private_key.as_canonical().is_some());
        let sig = sign(&pair.private_key, b"x").unwrap();
        assert!(verify(&public_of(&pair), &sig, b"x").unwrap());
    }

    #[test]
    fn public_key_cannot_sign() {
        let pair = make_signature_key_pair(true).unwrap();
        let err = sign(&public_of(&pair), b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKeyFormat);
    }

    #[test]
    fn malformed_key_is_an_error() {
        let err = verify(&KeyMaterial::encoded(vec![9; 12]), &[0u8; 64], b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedKeyFormat);
    }
}
