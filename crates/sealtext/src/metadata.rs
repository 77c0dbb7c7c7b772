//! Namespace / name discovery from a manifest's `metadata:` block
//!
//! A line scan rather than a YAML parse: the buffer is often a partial or
//! multi-document manifest being edited, and only the two scalars matter.

use regex::Regex;

use crate::error::{Result, SealError};
use crate::request::SecretRef;

/// Values found in a buffer's metadata blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub namespace: Option<String>,
    pub name: Option<String>,
}

impl Metadata {
    /// Combine with explicit overrides into a complete secret reference
    ///
    /// Overrides win field by field; empty values count as missing.
    pub fn resolve(self, namespace: Option<String>, name: Option<String>) -> Result<SecretRef> {
        let namespace = non_empty(namespace)
            .or(non_empty(self.namespace))
            .ok_or(SealError::MissingMetadata { field: "namespace" })?;
        let name = non_empty(name)
            .or(non_empty(self.name))
            .ok_or(SealError::MissingMetadata { field: "name" })?;

        Ok(SecretRef { namespace, name })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Scans buffers for `metadata.namespace` and `metadata.name`
pub struct MetadataScanner {
    block_start: Regex,
    top_level: Regex,
    namespace: Regex,
    name: Regex,
}

impl Default for MetadataScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataScanner {
    pub fn new() -> Self {
        Self {
            block_start: Regex::new(r"^\s*metadata:\s*$").unwrap(),
            top_level: Regex::new(r"^[a-zA-Z]").unwrap(),
            namespace: Regex::new(r"^\s*namespace:\s*(\S+)").unwrap(),
            name: Regex::new(r"^\s*name:\s*(\S+)").unwrap(),
        }
    }

    /// Scan `content`; later matches override earlier ones
    pub fn scan(&self, content: &str) -> Metadata {
        let mut found = Metadata::default();
        let mut in_metadata = false;

        for line in content.lines() {
            if self.block_start.is_match(line) {
                in_metadata = true;
                continue;
            }

            if in_metadata && self.top_level.is_match(line) {
                in_metadata = false;
            }

            if !in_metadata {
                continue;
            }

            if let Some(caps) = self.namespace.captures(line) {
                found.namespace = Some(caps[1].to_string());
            }
            if let Some(caps) = self.name.captures(line) {
                found.name = Some(caps[1].to_string());
            }
        }

        found
    }
}
