//! Integration tests for the sealkit crypto module.

use sealkit::crypto::{
    decrypt, decrypt_text, digest, encrypt, from_base64, import_key, keyed_digest, make_key,
    make_signature_key_pair, password_decrypt, password_decrypt_with_params, password_encrypt,
    password_encrypt_with_params, sign, to_base64, verify, HashAlgorithm, KeyMaterial, PasswordParams,
    EXTENDED_ITERATIONS,
};
use sealkit::errors::ErrorKind;

// ---------------------------------------------------------------------------
// Direct symmetric encryption
// ---------------------------------------------------------------------------

#[test]
fn symmetric_roundtrip() {
    let key = make_key(true).expect("make key");
    let plaintext = b"DATABASE_URL=postgres://localhost/mydb";

    let envelope = encrypt(&key, plaintext, None).expect("encrypt should succeed");
    assert!(envelope.ciphertext.len() > plaintext.len());

    let recovered = decrypt(&key, &envelope.nonce, &envelope.ciphertext).expect("decrypt");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_nonce_each_time() {
    let key = make_key(false).unwrap();

    let one = encrypt(&key, b"SECRET=hello", None).unwrap();
    let two = encrypt(&key, b"SECRET=hello", None).unwrap();

    assert_ne!(one.nonce, two.nonce, "nonces must not repeat");
    assert_ne!(one.ciphertext, two.ciphertext);
}

#[test]
fn exported_key_decrypts_after_import() {
    let key = make_key(true).unwrap();
    let envelope = encrypt(&key, b"portable", None).unwrap();

    let imported = import_key(&key.export().unwrap(), false).unwrap();
    assert_eq!(
        decrypt_text(&imported, &envelope.nonce, &envelope.ciphertext).unwrap(),
        "portable"
    );
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let envelope = encrypt(&make_key(true).unwrap(), b"secret", None).unwrap();
    let err = decrypt(&make_key(true).unwrap(), &envelope.nonce, &envelope.ciphertext).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure);
}

#[test]
fn flipping_any_ciphertext_or_nonce_byte_is_detected() {
    let key = make_key(true).unwrap();
    let envelope = encrypt(&key, b"tamper me", None).unwrap();

    for i in 0..envelope.ciphertext.len() {
        let mut ct = envelope.ciphertext.clone();
        ct[i] ^= 0x01;
        let err = decrypt(&key, &envelope.nonce, &ct).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure, "byte {i}");
    }
    for i in 0..envelope.nonce.len() {
        let mut nonce = envelope.nonce.clone();
        nonce[i] ^= 0x80;
        let err = decrypt(&key, &nonce, &envelope.ciphertext).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure, "nonce byte {i}");
    }
}

#[test]
fn empty_plaintext_roundtrip() {
    let key = make_key(true).unwrap();
    let envelope = encrypt(&key, b"", None).unwrap();
    assert_eq!(envelope.ciphertext.len(), 16);
    assert!(decrypt(&key, &envelope.nonce, &envelope.ciphertext)
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Password tokens
// ---------------------------------------------------------------------------

#[test]
fn password_roundtrip() {
    let token = password_encrypt("s3cret-pass", "héllo wörld".as_bytes()).unwrap();
    assert_eq!(password_decrypt("s3cret-pass", &token).unwrap(), "héllo wörld");
}

#[test]
fn password_iteration_counts_are_mutually_incompatible() {
    let short = PasswordParams::default();
    let long = PasswordParams {
        iterations: EXTENDED_ITERATIONS,
    };

    let short_token = password_encrypt_with_params("pw", b"payload", &short).unwrap();
    let long_token = password_encrypt_with_params("pw", b"payload", &long).unwrap();

    assert_eq!(password_decrypt_with_params("pw", &short_token, &short).unwrap(), "payload");
    assert_eq!(password_decrypt_with_params("pw", &long_token, &long).unwrap(), "payload");

    assert_eq!(
        password_decrypt_with_params("pw", &short_token, &long)
            .unwrap_err()
            .kind(),
        ErrorKind::AeadAuthenticationFailure
    );
    assert_eq!(
        password_decrypt_with_params("pw", &long_token, &short)
            .unwrap_err()
            .kind(),
        ErrorKind::AeadAuthenticationFailure
    );
}

#[test]
fn flipping_any_password_token_ciphertext_byte_is_detected() {
    let token = password_encrypt("pw", b"tamper me").unwrap();
    let json: serde_json::Value =
        serde_json::from_slice(&from_base64("token", &token).unwrap()).unwrap();
    let ciphertext = from_base64("ciphertext", json["ciphertext"].as_str().unwrap()).unwrap();

    for i in 0..ciphertext.len() {
        let mut ct = ciphertext.clone();
        ct[i] ^= 0x01;
        let mut tampered = json.clone();
        tampered["ciphertext"] = serde_json::Value::String(to_base64(&ct));
        let tampered = to_base64(&serde_json::to_vec(&tampered).unwrap());

        let err = password_decrypt("pw", &tampered).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure, "byte {i}");
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

#[test]
fn signature_lifecycle() {
    let pair = make_signature_key_pair(true).unwrap();
    let public: KeyMaterial = pair.public_key.parse().unwrap();

    let sig = sign(&pair.private_key, b"hello").unwrap();
    assert!(verify(&public, &sig, b"hello").unwrap());
    assert!(!verify(&public, &sig, b"hellO").unwrap());
    assert!(!verify(&public, &[0u8; 64], b"hello").unwrap());

    let other = make_signature_key_pair(true).unwrap();
    let other_public: KeyMaterial = other.public_key.parse().unwrap();
    assert!(!verify(&other_public, &sig, b"hello").unwrap());
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

#[test]
fn digest_known_vectors() {
    assert_eq!(
        digest(HashAlgorithm::Sha256, "test data", None).unwrap(),
        "kW8AJ6V1B0znKjMXd8NHjWUT94alkb2JLaGld78jNfk="
    );
    assert_eq!(
        digest(HashAlgorithm::Sha256, "", None).unwrap(),
        "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
    );
    assert_eq!(
        keyed_digest(b"secret", b"data").unwrap(),
        "1b2c16b75bd2a870c114153ccda5bcfca63314bc722fa160d690de133ccbb9db"
    );
}

#[test]
fn digest_length_controls_output_size() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    for algorithm in HashAlgorithm::ALL {
        for len in [1usize, 7, 16, 100] {
            let out = digest(algorithm, "abc", Some(len)).unwrap();
            assert_eq!(STANDARD.decode(out).unwrap().len(), len, "{algorithm} {len}");
        }
    }

    let err = digest(HashAlgorithm::Sha512, "abc", Some(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}
