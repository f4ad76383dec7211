//! `sealkit digest` / `sealkit hmac`.

use serde::Serialize;

use crate::config::Settings;
use crate::crypto::{digest, keyed_digest, verify_keyed_digest, HashAlgorithm};
use crate::cli::print_json;
use crate::errors::{Result, SealError};

#[derive(Debug, Serialize)]
struct Verification {
    valid: bool,
}

/// Execute the `digest` command.
pub fn execute_digest(
    settings: &Settings,
    algorithm: Option<&str>,
    length: Option<i64>,
    text: &str,
) -> Result<()> {
    let algorithm: HashAlgorithm = match algorithm {
        Some(name) => name.parse()?,
        None => settings.digest_algorithm()?,
    };
    let length = length.map(output_length).transpose()?;

    println!("{}", digest(algorithm, text, length)?);
    Ok(())
}

/// Execute the `hmac` command.
pub fn execute_hmac(secret: &str, data: &str, expected: Option<&str>) -> Result<()> {
    match expected {
        Some(hex) => {
            let valid = verify_keyed_digest(secret.as_bytes(), data.as_bytes(), hex)?;
            print_json(&Verification { valid })
        }
        None => {
            println!("{}", keyed_digest(secret.as_bytes(), data.as_bytes())?);
            Ok(())
        }
    }
}

fn output_length(length: i64) -> Result<usize> {
    if length < 1 {
        return Err(SealError::InvalidParameter(format!(
            "digest length must be greater than 0, got {length}"
        )));
    }
    usize::try_from(length)
        .map_err(|_| SealError::InvalidParameter(format!("digest length {length} is too large")))
}
