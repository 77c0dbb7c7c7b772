//! Standard paths used by sealtext

use std::path::PathBuf;

/// Environment variable that overrides the settings file location
pub const CONFIG_ENV: &str = "SEALTEXT_CONFIG";

/// Standard sealtext paths
pub struct Paths {
    /// Config directory (~/.config/sealtext)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sealtext");

        Self { config }
    }

    /// Default settings file (~/.config/sealtext/config.toml)
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Settings file to use: explicit path, then `SEALTEXT_CONFIG`, then the default
    pub fn resolve_config_file(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| self.config_file())
    }
}
