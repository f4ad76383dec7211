//! Cryptographic operations for sealkit.
//!
//! This module provides:
//! - Key-format normalization for P-256 keys (`keys`, `normalize`)
//! - AES-256-GCM envelopes with direct keys (`encryption`)
//! - ECDH agreement envelopes, raw and HKDF-derived (`agreement`, `derived`)
//! - Password tokens (`password`)
//! - ECDSA signatures (`signature`)
//! - Hashes and HMAC (`digest`)

pub mod agreement;
pub mod derived;
pub mod diagnostics;
pub mod digest;
pub mod encoding;
pub mod encryption;
pub mod engine;
pub mod keys;
pub mod normalize;
pub mod password;
pub mod signature;

// Re-export the public operations so callers can write:
//   use sealkit::crypto::{encrypt, agreement_encrypt, sign, ...};
pub use agreement::{agreement_decrypt, agreement_encrypt, make_agreement_key_pair, AgreementKeyPair};
pub use derived::{derived_decrypt, derived_encrypt};
pub use diagnostics::DecryptDiagnostic;
pub use digest::{digest, keyed_digest, verify_keyed_digest, HashAlgorithm};
pub use encoding::{from_base64, to_base64};
pub use encryption::{
    decrypt, decrypt_text, encrypt, import_key, make_key, EnvelopeCiphertext, SymmetricKey,
};
pub use engine::engine;
pub use keys::{CanonicalKey, Curve, KeyEncoding, KeyFamily, KeyMaterial, KeyRole, KeyUsage};
pub use normalize::normalize;
pub use password::{
    password_decrypt, password_decrypt_with_params, password_encrypt,
    password_encrypt_with_params, PasswordParams, DEFAULT_ITERATIONS, EXTENDED_ITERATIONS,
};
pub use signature::{make_signature_key_pair, sign, verify, SignatureKeyPair};
