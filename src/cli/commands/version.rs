//! `sealkit version`: display version and the crypto backends in use.

use console::style;

use crate::crypto::engine;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("sealkit {}", env!("CARGO_PKG_VERSION"));
    println!(
        "{} AES-256-GCM, ECDH/ECDSA P-256, HKDF-SHA256, SHA-1/2 (RustCrypto)",
        style("backends:").dim()
    );

    match engine() {
        Ok(_) => println!("{} OS random source ready", style("engine:").dim()),
        Err(e) => println!("{} {}", style("engine:").dim(), style(e).red()),
    }

    Ok(())
}
