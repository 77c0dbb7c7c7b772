//! The text transform command
//!
//! Resolves the text to work on, works out which secret it belongs to, hands
//! it to a `TextSealer` and splices the result back into the buffer. The
//! buffer is only ever copied: on any error the caller still holds the
//! original.

use std::future::Future;

use tracing::debug;

use crate::buffer::{Buffer, Selection};
use crate::error::{Result, SealError};
use crate::metadata::MetadataScanner;
use crate::request::{Mode, SecretRef};
use crate::sealer::TextSealer;

/// Everything a transform needs besides the sealer
#[derive(Debug, Clone)]
pub struct TransformInput {
    pub mode: Mode,
    pub buffer: Buffer,
    pub selection: Option<Selection>,
    /// Overrides for values found in the buffer's metadata
    pub namespace: Option<String>,
    pub name: Option<String>,
}

/// Result of a successful transform
#[derive(Debug, Clone)]
pub struct Transformed {
    pub secret: SecretRef,
    /// What the sealer produced for the selection
    pub output: String,
    /// The buffer with the selection replaced by `output`
    pub buffer: String,
}

/// Run a transform to completion
pub async fn run(sealer: &dyn TextSealer, input: &TransformInput) -> Result<Transformed> {
    run_until(sealer, input, std::future::pending::<()>()).await
}

/// Run a transform, giving up when `cancel` resolves
///
/// Giving up drops the in-flight sealer future; kubeseal children are
/// spawned kill-on-drop so nothing is left running.
pub async fn run_until<C>(
    sealer: &dyn TextSealer,
    input: &TransformInput,
    cancel: C,
) -> Result<Transformed>
where
    C: Future<Output = ()>,
{
    let text = input.buffer.selected(input.selection)?;
    if text.trim().is_empty() {
        return Err(SealError::EmptyInput);
    }

    let secret = MetadataScanner::new()
        .scan(input.buffer.text())
        .resolve(input.namespace.clone(), input.name.clone())?;
    debug!(
        "Transforming {} bytes for {}/{}",
        text.len(),
        secret.namespace,
        secret.name
    );

    let output = tokio::select! {
        res = sealer.transform(input.mode, text, &secret) => res?,
        _ = cancel => return Err(SealError::Cancelled),
    };

    let buffer = input.buffer.replace(input.selection, &output)?;

    Ok(Transformed {
        secret,
        output,
        buffer,
    })
}
