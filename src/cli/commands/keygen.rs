//! `sealkit keygen`: generate exportable keys and key pairs.
//!
//! Usage:
//!   sealkit keygen symmetric
//!   sealkit keygen agreement --format table
//!   sealkit keygen signature

use serde::Serialize;

use crate::cli::output;
use crate::cli::{print_json, KeyFormat, KeyKind};
use crate::crypto::{make_agreement_key_pair, make_key, make_signature_key_pair};
use crate::errors::{Result, SealError};

#[derive(Debug, Serialize)]
struct SymmetricOutput {
    key: String,
}

#[derive(Debug, Serialize)]
struct AgreementOutput {
    public_key: String,
    private_key: String,
    raw_public_key: String,
    raw_public_key_compact: String,
    jwk_public_key: Option<String>,
    jwk_private_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignatureOutput {
    public_key: String,
    private_key: String,
}

/// Execute the `keygen` command.
pub fn execute(kind: KeyKind, format: KeyFormat) -> Result<()> {
    tracing::debug!(?kind, ?format, "generating key");

    match kind {
        KeyKind::Symmetric => {
            let out = SymmetricOutput {
                key: make_key(true)?.export()?,
            };
            match format {
                KeyFormat::Json => print_json(&out)?,
                KeyFormat::Table => output::print_key_table(&[("key", out.key)]),
            }
        }
        KeyKind::Agreement => {
            let pair = make_agreement_key_pair(true)?;
            let out = AgreementOutput {
                private_key: exported(pair.private_key.to_base64())?,
                public_key: pair.public_key,
                raw_public_key: pair.raw_public_key,
                raw_public_key_compact: pair.raw_public_key_compact,
                jwk_public_key: pair.jwk_public_key,
                jwk_private_key: pair.jwk_private_key.map(|jwk| jwk.to_string()),
            };
            match format {
                KeyFormat::Json => print_json(&out)?,
                KeyFormat::Table => {
                    let mut rows = vec![
                        ("public_key", out.public_key),
                        ("private_key", out.private_key),
                        ("raw_public_key", out.raw_public_key),
                        ("raw_public_key_compact", out.raw_public_key_compact),
                    ];
                    if let Some(jwk) = out.jwk_public_key {
                        rows.push(("jwk_public_key", jwk));
                    }
                    if let Some(jwk) = out.jwk_private_key {
                        rows.push(("jwk_private_key", jwk));
                    }
                    output::print_key_table(&rows);
                }
            }
        }
        KeyKind::Signature => {
            let pair = make_signature_key_pair(true)?;
            let out = SignatureOutput {
                private_key: exported(pair.private_key.to_base64())?,
                public_key: pair.public_key,
            };
            match format {
                KeyFormat::Json => print_json(&out)?,
                KeyFormat::Table => output::print_key_table(&[
                    ("public_key", out.public_key),
                    ("private_key", out.private_key),
                ]),
            }
        }
    }

    output::success(match kind {
        KeyKind::Symmetric => "Generated symmetric key",
        KeyKind::Agreement => "Generated agreement key pair",
        KeyKind::Signature => "Generated signature key pair",
    });
    output::warning("Private keys are printed in the clear; store them securely.");
    Ok(())
}

fn exported(encoded: Option<String>) -> Result<String> {
    encoded.ok_or_else(|| SealError::CommandFailed("generated private key is not exportable".into()))
}
