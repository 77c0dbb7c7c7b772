//! sealtext - Seal and unseal Kubernetes secret values in text
//!
//! "Select, seal, done."
//!
//! Takes a selection (or a whole buffer), pipes it through `kubeseal` and
//! splices the result back in. kubeseal does all of the cryptography; this
//! crate bounds the subprocess, works out which secret the text belongs to,
//! and reports failures without touching the original text.

pub mod buffer;
pub mod command;
pub mod error;
pub mod invoke;
pub mod metadata;
pub mod request;
pub mod sealer;

#[cfg(test)]
mod testing;

pub use buffer::{Buffer, Selection};
pub use command::{TransformInput, Transformed};
pub use error::{Result, SealError};
pub use invoke::{locate_binary, Invoker};
pub use metadata::{Metadata, MetadataScanner};
pub use request::{InvocationRequest, InvocationResult, Mode, SecretRef};
pub use sealer::{sealed_secret_document, Kubeseal, TextSealer};
