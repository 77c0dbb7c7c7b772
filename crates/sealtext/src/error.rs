//! Error taxonomy for sealtext operations

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while transforming text through kubeseal
#[derive(Error, Debug)]
pub enum SealError {
    #[error("Nothing to transform - select some text first")]
    EmptyInput,

    #[error("{binary} not found - install kubeseal and add it to PATH")]
    BinaryNotFound { binary: String },

    #[error("kubeseal failed (exit code {code}): {stderr}")]
    ExternalTool { code: i32, stderr: String },

    #[error("kubeseal did not finish within {after:?} and was terminated")]
    Timeout { after: Duration },

    #[error("Cancelled - kubeseal was terminated")]
    Cancelled,

    #[error("Missing {field} - no value in the document metadata, pass --{field}")]
    MissingMetadata { field: &'static str },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Certificate path not configured - set cert_path or pass --cert")]
    CertificateNotConfigured,

    #[error("Certificate file not found: {}", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("Private key path not configured - set private_key_path or pass --private-key")]
    PrivateKeyNotConfigured,

    #[error("Private key file not found: {}", .0.display())]
    PrivateKeyNotFound(PathBuf),

    #[error("Working directory not found: {}", .0.display())]
    WorkingDirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SealError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SealError::ExternalTool { .. } | SealError::Io(_) => 1,
            SealError::Timeout { .. } => 124,
            SealError::BinaryNotFound { .. } => 127,
            SealError::Cancelled => 130,
            _ => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, SealError>;
