//! sealtext - Seal and unseal Kubernetes secret values with kubeseal
//!
//! "Select, seal, done."
//!
//! The command-line face of the editor commands "Encrypt String" and
//! "Decrypt String": read a buffer, transform a selection through kubeseal,
//! write the buffer back.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the transformed text
    let default_filter = if cli.verbose {
        "sealtext=debug,sealtext_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { cli::run(cli).await })
}
