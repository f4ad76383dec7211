//! ECDH (P-256) key agreement envelopes.
//!
//! The AES-256 key is the raw ECDH shared secret (the x-coordinate of
//! the shared point).  ECDH is commutative, so Alice's private key with
//! Bob's public key yields the same AES key as Bob's private key with
//! Alice's public key.  The key is stable for a given pairing; only the
//! random nonce changes between messages.

use aes_gcm::aead::consts::U16;
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};
use p256::SecretKey;
use zeroize::Zeroizing;

use super::diagnostics::diagnose;
use super::encoding::to_base64;
use super::encryption::{self, EnvelopeCiphertext, SymmetricKey, KEY_LEN};
use super::engine::engine;
use super::keys::{CanonicalKey, KeyFamily, KeyMaterial, KeyRepr, KeyRole};
use super::normalize::normalize_as;
use crate::errors::{Result, SealError};

/// A freshly generated agreement key pair in every export form.
#[derive(Debug, Clone)]
pub struct AgreementKeyPair {
    /// SPKI, base64.
    pub public_key: String,
    /// PKCS8 bytes when exportable, otherwise a canonical handle.
    pub private_key: KeyMaterial,
    /// 65-byte uncompressed point, base64.
    pub raw_public_key: String,
    /// 64-byte point without the `0x04` marker, base64.
    pub raw_public_key_compact: String,
    /// JWK of the public key; only for exportable pairs.
    pub jwk_public_key: Option<String>,
    /// JWK of the private key; only for exportable pairs.
    pub jwk_private_key: Option<Zeroizing<String>>,
}

/// Generate a P-256 agreement key pair.
pub fn make_agreement_key_pair(exportable: bool) -> Result<AgreementKeyPair> {
    let secret = SecretKey::random(&mut engine()?.rng());
    let public = secret.public_key();

    let spki = public
        .to_public_key_der()
        .map_err(|e| SealError::InvalidParameter(format!("SPKI export failed: {e}")))?;
    let point = public.to_encoded_point(false);
    let raw = point.as_bytes();

    let (private_key, jwk_public_key, jwk_private_key) = if exportable {
        let pkcs8 = secret
            .to_pkcs8_der()
            .map_err(|e| SealError::InvalidParameter(format!("PKCS8 export failed: {e}")))?;
        (
            KeyMaterial::with_role(pkcs8.as_bytes().to_vec(), KeyRole::Private),
            Some(public.to_jwk_string()),
            Some(secret.to_jwk_string()),
        )
    } else {
        let handle = CanonicalKey::new(KeyRepr::AgreementPrivate(secret), false, None);
        (KeyMaterial::Canonical(handle), None, None)
    };

    Ok(AgreementKeyPair {
        public_key: to_base64(spki.as_bytes()),
        private_key,
        raw_public_key: to_base64(raw),
        raw_public_key_compact: to_base64(&raw[1..]),
        jwk_public_key,
        jwk_private_key,
    })
}

/// Raw 256-bit ECDH shared secret between a private and a public key.
pub(crate) fn shared_secret(
    private_key: &KeyMaterial,
    public_key: &KeyMaterial,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let private = normalize_as(private_key, KeyFamily::Agreement, KeyRole::Private)?;
    let public = normalize_as(public_key, KeyFamily::Agreement, KeyRole::Public)?;

    let (secret, public) = match (private.repr(), public.repr()) {
        (KeyRepr::AgreementPrivate(secret), KeyRepr::AgreementPublic(public)) => (secret, public),
        _ => {
            return Err(SealError::InvalidKeyFormat(
                "key agreement needs a private and a public agreement key".into(),
            ))
        }
    };

    let shared = diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    out.copy_from_slice(shared.raw_secret_bytes().as_slice());
    Ok(out)
}

fn agreement_key(private_key: &KeyMaterial, public_key: &KeyMaterial) -> Result<SymmetricKey> {
    let secret = shared_secret(private_key, public_key)?;
    Ok(SymmetricKey::derived(*secret))
}

/// Encrypt `plaintext` under the ECDH key of `private_key` × `public_key`.
pub fn agreement_encrypt(
    private_key: &KeyMaterial,
    public_key: &KeyMaterial,
    plaintext: &[u8],
) -> Result<EnvelopeCiphertext> {
    let key = agreement_key(private_key, public_key)?;
    encryption::encrypt(&key, plaintext, None)
}

/// Decrypt an agreement envelope with the complementary key pairing.
pub fn agreement_decrypt(
    private_key: &KeyMaterial,
    public_key: &KeyMaterial,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    agreement_key(private_key, public_key)
        .and_then(|key| encryption::open::<U16>(&key, nonce, ciphertext))
        .map_err(|e| diagnose("agreement decrypt", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn public_of(pair: &AgreementKeyPair) -> KeyMaterial {
        pair.public_key.parse().unwrap()
    }

    #[test]
    fn shared_secret_is_symmetric() {
        let alice = make_agreement_key_pair(true).unwrap();
        let bob = make_agreement_key_pair(true).unwrap();

        let ab = shared_secret(&alice.private_key, &public_of(&bob)).unwrap();
        let ba = shared_secret(&bob.private_key, &public_of(&alice)).unwrap();
        assert_eq!(*ab, *ba);
    }

    #[test]
    fn hello_scenario() {
        let a = make_agreement_key_pair(true).unwrap();
        let b = make_agreement_key_pair(true).unwrap();

        let sealed = agreement_encrypt(&a.private_key, &public_of(&b), b"hello").unwrap();
        let opened =
            agreement_decrypt(&b.private_key, &public_of(&a), &sealed.nonce, &sealed.ciphertext)
                .unwrap();
        assert_eq!(opened, b"hello");

        let sealed = agreement_encrypt(&b.private_key, &public_of(&a), b"hello").unwrap();
        let opened =
            agreement_decrypt(&a.private_key, &public_of(&b), &sealed.nonce, &sealed.ciphertext)
                .unwrap();
        assert_eq!(opened, b"hello");
    }

    #[test]
    fn exportable_pair_has_every_form() {
        let pair = make_agreement_key_pair(true).unwrap();
        assert!(pair.private_key.to_base64().is_some());
        assert!(pair.jwk_public_key.as_deref().unwrap().contains("P-256"));
        assert!(pair.jwk_private_key.is_some());

        let raw = crate::crypto::encoding::from_base64("raw", &pair.raw_public_key).unwrap();
        let compact =
            crate::crypto::encoding::from_base64("compact", &pair.raw_public_key_compact).unwrap();
        assert_eq!(raw.len(), 65);
        assert_eq!(compact.len(), 64);
    }

    #[test]
    fn non_exportable_pair_keeps_a_handle() {
        let pair = make_agreement_key_pair(false).unwrap();
        let handle = pair.private_key.as_canonical().expect("handle");
        assert!(!handle.is_extractable());
        assert!(pair.private_key.to_base64().is_none());
        assert!(pair.jwk_private_key.is_none());
    }

    #[test]
    fn two_public_keys_cannot_agree() {
        let a = make_agreement_key_pair(true).unwrap();
        let b = make_agreement_key_pair(true).unwrap();
        let err = agreement_encrypt(&public_of(&a), &public_of(&b), b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKeyFormat);
    }

    #[test]
    fn wrong_pairing_fails_authentication() {
        let a = make_agreement_key_pair(true).unwrap();
        let b = make_agreement_key_pair(true).unwrap();
        let c = make_agreement_key_pair(true).unwrap();

        let sealed = agreement_encrypt(&a.private_key, &public_of(&b), b"secret").unwrap();
        let err =
            agreement_decrypt(&c.private_key, &public_of(&a), &sealed.nonce, &sealed.ciphertext)
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure);
        assert_eq!(err.diagnostic().unwrap().operation, "agreement decrypt");
    }
}
