//! Settings for sealtext
//!
//! Mirrors the editor package settings: where the certificate and the
//! recovery private key live, how long to wait for `kubeseal`, and what to do
//! with decrypted output.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What to do with the output of a decrypt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecryptOutput {
    /// Replace the selection with the unsealed document
    #[default]
    Replace,
    /// Print the unsealed document and leave the buffer alone
    Print,
}

impl DecryptOutput {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecryptOutput::Replace => "replace",
            DecryptOutput::Print => "print",
        }
    }
}

impl FromStr for DecryptOutput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(DecryptOutput::Replace),
            // "new_tab" and "popup" are the editor package's names for printing
            "print" | "new_tab" | "popup" => Ok(DecryptOutput::Print),
            other => Err(format!("unknown decrypt output: {}", other)),
        }
    }
}

/// sealtext settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// kubeseal executable: a bare name looked up on PATH, or a path
    #[serde(default = "default_kubeseal")]
    pub kubeseal: String,

    /// Public certificate used for sealing
    #[serde(default)]
    pub cert_path: Option<PathBuf>,

    /// Controller private key used for offline unsealing
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Seconds to wait for kubeseal before killing it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Output handling for decrypt
    #[serde(default)]
    pub decrypt_output: DecryptOutput,
}

fn default_kubeseal() -> String {
    "kubeseal".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kubeseal: default_kubeseal(),
            cert_path: None,
            private_key_path: None,
            timeout_secs: default_timeout(),
            decrypt_output: DecryptOutput::default(),
        }
    }
}

impl Config {
    /// Load settings from file, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        if config.timeout_secs == 0 {
            bail!(
                "Invalid settings in {}: timeout_secs must be at least 1",
                path.display()
            );
        }
        Ok(config)
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }
}
