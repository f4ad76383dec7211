//! Process-wide handle on the secure random source.
//!
//! Every nonce, salt and generated key in sealkit comes from the OS
//! CSPRNG.  The source is probed once, on first use, and the outcome is
//! cached for the life of the process: if the probe fails, every later
//! call reports the same `EngineUnavailable` error without probing again.

use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::{Result, SealError};

/// Bytes drawn from the OS source when the engine is first resolved.
const PROBE_LEN: usize = 32;

static ENGINE: OnceCell<std::result::Result<Engine, String>> = OnceCell::new();

/// Resolved cryptographic engine.
///
/// Digest, AEAD, ECDH, ECDSA and HKDF are the RustCrypto crates called
/// directly; this handle only gates access to randomness so that an
/// unusable OS source is detected once and reported uniformly.
#[derive(Debug)]
pub struct Engine {
    _resolved: (),
}

impl Engine {
    /// Fill `buf` with cryptographically secure random bytes.
    pub fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| SealError::EngineUnavailable(format!("OS random source failed: {e}")))
    }

    /// Return `N` fresh random bytes.
    pub fn random_array<const N: usize>(&self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.fill(&mut out)?;
        Ok(out)
    }

    /// The RNG handed to key generation in `p256`.
    pub fn rng(&self) -> OsRng {
        OsRng
    }
}

/// Get the process-wide engine, resolving it on first use.
pub fn engine() -> Result<&'static Engine> {
    resolve(&ENGINE, probe_os_rng)
}

/// Resolve `cell` with `probe` the first time; replay the cached outcome after.
fn resolve<F>(cell: &OnceCell<std::result::Result<Engine, String>>, probe: F) -> Result<&Engine>
where
    F: FnOnce() -> std::result::Result<(), String>,
{
    let outcome = cell.get_or_init(|| match probe() {
        Ok(()) => {
            tracing::debug!("crypto engine resolved");
            Ok(Engine { _resolved: () })
        }
        Err(reason) => {
            tracing::error!(%reason, "crypto engine unavailable");
            Err(reason)
        }
    });

    outcome
        .as_ref()
        .map_err(|reason| SealError::EngineUnavailable(reason.clone()))
}

fn probe_os_rng() -> std::result::Result<(), String> {
    let mut probe = [0u8; PROBE_LEN];
    OsRng
        .try_fill_bytes(&mut probe)
        .map_err(|e| format!("OS random source failed: {e}"))
}
