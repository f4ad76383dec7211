//! Decrypt-failure diagnostics.
//!
//! When a decrypt operation fails, the failure is captured as a
//! [`DecryptDiagnostic`] (kind, message, causal chain), emitted as a
//! `tracing` error event, and attached to the error returned to the
//! caller.  Diagnostics are built only from error text, which never
//! contains plaintext or key bytes.

use std::error::Error as StdError;

use serde::Serialize;

use crate::errors::{ErrorKind, SealError};

/// Snapshot of a decrypt failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptDiagnostic {
    /// Operation that failed, e.g. `"derived decrypt"`.
    pub operation: &'static str,
    pub kind: ErrorKind,
    pub message: String,
    /// Messages of the error's sources, outermost first.
    pub causes: Vec<String>,
}

impl DecryptDiagnostic {
    /// Capture `err` without consuming it.
    pub fn capture(operation: &'static str, err: &SealError) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            operation,
            kind: err.kind(),
            message: err.to_string(),
            causes,
        }
    }
}

/// Capture, log and wrap a decrypt failure.
pub(crate) fn diagnose(operation: &'static str, err: SealError) -> SealError {
    // Already wrapped by an inner decrypt path; keep the innermost capture.
    if err.diagnostic().is_some() {
        return err;
    }

    let diagnostic = DecryptDiagnostic::capture(operation, &err);
    tracing::error!(
        operation = diagnostic.operation,
        kind = %diagnostic.kind,
        message = %diagnostic.message,
        causes = ?diagnostic.causes,
        "decryption failed"
    );

    SealError::Decrypt {
        diagnostic: Box::new(diagnostic),
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnose_preserves_kind_and_message() {
        let err = diagnose(
            "derived decrypt",
            SealError::AeadAuthenticationFailure("tag mismatch".into()),
        );

        assert_eq!(err.kind(), ErrorKind::AeadAuthenticationFailure);
        let diag = err.diagnostic().expect("diagnostic attached");
        assert_eq!(diag.operation, "derived decrypt");
        assert_eq!(diag.kind, ErrorKind::AeadAuthenticationFailure);
        assert_eq!(diag.message, "AEAD authentication failed: tag mismatch");
        assert!(diag.causes.is_empty());
    }

    #[test]
    fn wrapped_error_exposes_its_source() {
        let err = diagnose("decrypt", SealError::MalformedEnvelope("bad json".into()));
        assert_eq!(err.to_string(), "decrypt failed");
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "Malformed envelope: bad json");
    }

    #[test]
    fn capture_walks_the_causal_chain() {
        let inner = diagnose("decrypt", SealError::InvalidParameter("short".into()));
        let diag = DecryptDiagnostic::capture("outer", &inner);
        assert_eq!(diag.message, "decrypt failed");
        assert_eq!(diag.causes, vec!["Invalid parameter: short".to_string()]);
        assert_eq!(diag.kind, ErrorKind::InvalidParameter);
    }

    #[test]
    fn diagnose_does_not_double_wrap() {
        let once = diagnose("decrypt", SealError::AeadAuthenticationFailure("x".into()));
        let twice = diagnose("password decrypt", once);
        assert_eq!(twice.diagnostic().unwrap().operation, "decrypt");
    }
}
