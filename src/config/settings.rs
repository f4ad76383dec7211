use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::digest::HashAlgorithm;
use crate::crypto::password::{PasswordParams, DEFAULT_ITERATIONS};
use crate::errors::{Result, SealError};

/// Tool configuration, loaded from `.sealkit.toml`.
///
/// Every field has a default, so sealkit works without a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// SHA-512 stretch rounds for password tokens (default: 10).
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,

    /// Algorithm used by `sealkit digest` when none is given.
    #[serde(default = "default_digest_algorithm")]
    pub digest_algorithm: String,

    /// Log filter used when `SEALKIT_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_password_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_digest_algorithm() -> String {
    "SHA-256".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            password_iterations: default_password_iterations(),
            digest_algorithm: default_digest_algorithm(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = ".sealkit.toml";

    /// Load settings from `<dir>/.sealkit.toml`.
    ///
    /// A missing file yields defaults; a file that does not parse, or
    /// that names an unknown digest algorithm or zero iterations, is a
    /// `ConfigError`.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            SealError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate().map_err(|e| {
            SealError::ConfigError(format!("{}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.password_iterations == 0 {
            return Err(SealError::ConfigError(
                "password_iterations must be at least 1".into(),
            ));
        }
        self.digest_algorithm()?;
        Ok(())
    }

    /// Convert the password settings into crypto-layer params.
    pub fn password_params(&self) -> PasswordParams {
        PasswordParams {
            iterations: self.password_iterations,
        }
    }

    /// The configured default digest algorithm.
    pub fn digest_algorithm(&self) -> Result<HashAlgorithm> {
        self.digest_algorithm.parse()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
