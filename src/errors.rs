use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::crypto::diagnostics::DecryptDiagnostic;
use crate::crypto::keys::KeyEncoding;

/// All errors that can occur in sealkit.
#[derive(Debug, Error)]
pub enum SealError {
    // --- Key errors ---
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Unrecognized key format (tried {})", join_encodings(.attempted))]
    UnrecognizedKeyFormat { attempted: Vec<KeyEncoding> },

    // --- Engine errors ---
    #[error("Crypto engine unavailable: {0}")]
    EngineUnavailable(String),

    // --- Envelope errors ---
    #[error("AEAD authentication failed: {0}")]
    AeadAuthenticationFailure(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{} failed", .diagnostic.operation)]
    Decrypt {
        diagnostic: Box<DecryptDiagnostic>,
        #[source]
        source: Box<SealError>,
    },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Flat classification of a [`SealError`], stable across wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidKeyFormat,
    UnrecognizedKeyFormat,
    EngineUnavailable,
    AeadAuthenticationFailure,
    MalformedEnvelope,
    InvalidParameter,
    Config,
    Io,
    Serialization,
    Command,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidKeyFormat => "InvalidKeyFormat",
            ErrorKind::UnrecognizedKeyFormat => "UnrecognizedKeyFormat",
            ErrorKind::EngineUnavailable => "CryptoEngineUnavailable",
            ErrorKind::AeadAuthenticationFailure => "AEADAuthenticationFailure",
            ErrorKind::MalformedEnvelope => "MalformedEnvelope",
            ErrorKind::InvalidParameter => "InvalidParameter",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Io => "IoError",
            ErrorKind::Serialization => "SerializationError",
            ErrorKind::Command => "CommandFailed",
        };
        f.write_str(name)
    }
}

impl SealError {
    /// Classify this error. Diagnostic wrappers report the kind of the
    /// failure they wrap.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SealError::InvalidKeyFormat(_) => ErrorKind::InvalidKeyFormat,
            SealError::UnrecognizedKeyFormat { .. } => ErrorKind::UnrecognizedKeyFormat,
            SealError::EngineUnavailable(_) => ErrorKind::EngineUnavailable,
            SealError::AeadAuthenticationFailure(_) => ErrorKind::AeadAuthenticationFailure,
            SealError::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            SealError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            SealError::Decrypt { source, .. } => source.kind(),
            SealError::ConfigError(_) => ErrorKind::Config,
            SealError::Io(_) => ErrorKind::Io,
            SealError::SerializationError(_) => ErrorKind::Serialization,
            SealError::CommandFailed(_) => ErrorKind::Command,
        }
    }

    /// The captured diagnostic, if this error came out of a decrypt path.
    pub fn diagnostic(&self) -> Option<&DecryptDiagnostic> {
        match self {
            SealError::Decrypt { diagnostic, .. } => Some(&**diagnostic),
            _ => None,
        }
    }
}

fn join_encodings(attempted: &[KeyEncoding]) -> String {
    attempted
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for sealkit results.
pub type Result<T> = std::result::Result<T, SealError>;
