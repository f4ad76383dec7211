//! Password envelopes.
//!
//! A password token is self-contained:
//!
//! ```text
//! base64( JSON { "ciphertext": base64(AES-GCM output), "aes": base64(raw AES key) } )
//! ```
//!
//! The password never becomes the AES key.  It is stretched by repeated
//! SHA-512 (each round hashes the base64 text of the previous one), and
//! the ASCII bytes of the final 88-character base64 digest are used as
//! the GCM nonce.  The AES key is random per token and carried inside it.
//!
//! The nonce therefore depends on the password alone: every token made
//! with the same password and iteration count shares it.  GCM stays safe
//! only because each token gets a fresh AES key.  A token's key must
//! never encrypt a second plaintext under the same password.

use aes_gcm::aead::consts::U88;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, Zeroizing};

use super::diagnostics::diagnose;
use super::encoding::{base64_decode, base64_encode, from_base64, to_base64};
use super::encryption::{import_key, into_text, make_key, open, seal};
use crate::errors::{Result, SealError};

/// Stretch rounds used when nothing else is configured.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// The longer stretch some deployments were built with.  Tokens made
/// with one count cannot be opened with the other.
pub const EXTENDED_ITERATIONS: u32 = 5000;

/// Length of the stretched digest's base64 text, and so of the nonce.
pub const STRETCHED_LEN: usize = 88;

/// Password stretching parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Number of SHA-512 rounds (at least 1).
    pub iterations: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PasswordToken {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    ciphertext: Vec<u8>,
    aes: String,
}

impl Drop for PasswordToken {
    fn drop(&mut self) {
        self.aes.zeroize();
    }
}

/// Run the SHA-512 stretch and return the final base64 digest text.
pub fn stretch_password(password: &str, iterations: u32) -> Result<Zeroizing<String>> {
    if iterations == 0 {
        return Err(SealError::InvalidParameter(
            "password iterations must be at least 1".into(),
        ));
    }

    let mut current = Zeroizing::new(password.to_owned());
    for _ in 0..iterations {
        let digest = Sha512::digest(current.as_bytes());
        current = Zeroizing::new(to_base64(&digest));
    }
    Ok(current)
}

/// Encrypt with the default iteration count.
pub fn password_encrypt(password: &str, plaintext: &[u8]) -> Result<String> {
    password_encrypt_with_params(password, plaintext, &PasswordParams::default())
}

/// Encrypt `plaintext` into a self-contained password token.
pub fn password_encrypt_with_params(
    password: &str,
    plaintext: &[u8],
    params: &PasswordParams,
) -> Result<String> {
    let nonce = stretch_password(password, params.iterations)?;

    // Fresh key per token; see the module docs.
    let key = make_key(true)?;
    let ciphertext = seal::<U88>(&key, nonce.as_bytes(), plaintext)?;

    let token = PasswordToken {
        ciphertext,
        aes: key.export()?,
    };
    let json = Zeroizing::new(
        serde_json::to_vec(&token)
            .map_err(|e| SealError::SerializationError(format!("password token: {e}")))?,
    );
    Ok(to_base64(&json))
}

/// Decrypt a token made with the default iteration count.
pub fn password_decrypt(password: &str, token: &str) -> Result<String> {
    password_decrypt_with_params(password, token, &PasswordParams::default())
}

/// Decrypt a password token and return the plaintext as text.
pub fn password_decrypt_with_params(
    password: &str,
    token: &str,
    params: &PasswordParams,
) -> Result<String> {
    password_decrypt_bytes_with_params(password, token, params)
        .and_then(into_text)
        .map_err(|e| diagnose("password decrypt", e))
}

/// Decrypt a password token and return the raw plaintext.
pub fn password_decrypt_bytes_with_params(
    password: &str,
    token: &str,
    params: &PasswordParams,
) -> Result<Vec<u8>> {
    open_token(password, token, params).map_err(|e| diagnose("password decrypt", e))
}

fn open_token(password: &str, token: &str, params: &PasswordParams) -> Result<Vec<u8>> {
    let nonce = stretch_password(password, params.iterations)?;

    let json = Zeroizing::new(from_base64("password token", token)?);
    let token: PasswordToken = serde_json::from_slice(&json)
        .map_err(|e| SealError::MalformedEnvelope(format!("password token: {e}")))?;
    let key = import_key(&token.aes, false)
        .map_err(|e| SealError::MalformedEnvelope(format!("password token key: {e}")))?;

    open::<U88>(&key, nonce.as_bytes(), &token.ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn stretched_digest_is_88_chars() {
        let stretched = stretch_password("hunter2", DEFAULT_ITERATIONS).unwrap();
        assert_eq!(stretched.len(), STRETCHED_LEN);
        assert!(stretched.ends_with("=="));
    }

    #[test]
    fn one_round_is_plain_sha512_base64() {
        let stretched = stretch_password("", 1).unwrap();
        assert_eq!(
            stretched.as_str(),
            "z4PhNX7vuL3xVChQ1m2AB9Yg5AULVxXcg/SpIdNs6c5H0NE8XYXysP+DGNKHfuwvY7kxvUdBeoGlODJ6+SfaPg=="
        );
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = password_encrypt_with_params("pw", b"x", &PasswordParams { iterations: 0 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn round_trip() {
        let token = password_encrypt("correct horse", b"launch codes").unwrap();
        assert_eq!(password_decrypt("correct horse", &token).unwrap(), "launch codes");
    }

    #[test]
    fn token_is_base64_json_with_ciphertext_and_aes() {
        let token = password_encrypt("pw", b"data").unwrap();
        let json = from_base64("token", &token).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert!(value["ciphertext"].is_string());
        let aes = from_base64("aes", value["aes"].as_str().unwrap()).unwrap();
        assert_eq!(aes.len(), 32);
    }

    #[test]
    fn nonce_depends_only_on_password_so_keys_must_differ() {
        // Same password => same nonce; distinct tokens must carry distinct keys.
        let a = password_encrypt("pw", b"same").unwrap();
        let b = password_encrypt("pw", b"same").unwrap();
        let key_of = |t: &str| {
            let json = from_base64("token", t).unwrap();
            let v: serde_json::Value = serde_json::from_slice(&json).unwrap();
            v["aes"].as_str().unwrap().to_owned()
        };
        assert_ne!(key_of(&a), key_of(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_password_fails_authentication() {
        let token = password_encrypt("right", b"x").unwrap();
        let err = password_decrypt("wrong", &token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure);
        assert_eq!(err.diagnostic().unwrap().operation, "password decrypt");
    }

    #[test]
    fn iteration_counts_are_incompatible() {
        let extended = PasswordParams {
            iterations: EXTENDED_ITERATIONS,
        };
        let token = password_encrypt_with_params("pw", b"x", &extended).unwrap();
        assert_eq!(
            password_decrypt_with_params("pw", &token, &extended).unwrap(),
            "x"
        );
        let err = password_decrypt("pw", &token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure);
    }

    #[test]
    fn malformed_tokens() {
        let tokens = vec![
            "%%%".to_string(),
            to_base64(b"not json"),
            to_base64(br#"{"ciphertext":"AAAA"}"#),
            to_base64(br#"{"ciphertext":"AAAA","aes":"AAAA"}"#),
        ];
        for token in &tokens {
            let err = password_decrypt("pw", token).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedEnvelope, "token {token}");
        }
    }

    #[test]
    fn non_utf8_plaintext_on_text_path() {
        let token = password_encrypt("pw", &[0xc3, 0x28]).unwrap();
        let err = password_decrypt("pw", &token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEnvelope);

        let bytes =
            password_decrypt_bytes_with_params("pw", &token, &PasswordParams::default()).unwrap();
        assert_eq!(bytes, vec![0xc3, 0x28]);
    }
}
