//! sealtext Core - Shared functionality for the sealtext tool
//!
//! Standard locations, the TOML settings file, and process probes used
//! when supervising the external `kubeseal` binary.

pub mod config;
pub mod paths;
pub mod process;

pub use config::{Config, DecryptOutput};
pub use paths::Paths;
