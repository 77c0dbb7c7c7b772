//! Invocation request and result types

use std::path::PathBuf;

use crate::error::{Result, SealError};

/// Direction of the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
        }
    }
}

/// Namespace and name a value is sealed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

impl SecretRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// One request to the external tool
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub mode: Mode,
    /// Written to the tool's stdin
    pub input_text: String,
    pub working_directory: Option<PathBuf>,
}

impl InvocationRequest {
    /// Build a request; empty or whitespace-only input is rejected
    pub fn new(mode: Mode, input_text: impl Into<String>) -> Result<Self> {
        let input_text = input_text.into();
        if input_text.trim().is_empty() {
            return Err(SealError::EmptyInput);
        }
        Ok(Self {
            mode,
            input_text,
            working_directory: None,
        })
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }
}

/// What came back from one run of the external tool
#[derive(Debug, Clone)]
pub struct InvocationResult {
    /// -1 when the process was ended by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Consume the result: stdout minus one trailing newline, or the tool error
    pub fn into_output(self) -> Result<String> {
        if !self.success() {
            return Err(SealError::ExternalTool {
                code: self.exit_code,
                stderr: self.stderr.trim_end().to_string(),
            });
        }
        Ok(trim_trailing_newline(self.stdout))
    }
}

/// Drop a single trailing `\n` or `\r\n`
pub fn trim_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_input() {
        assert!(matches!(
            InvocationRequest::new(Mode::Encrypt, ""),
            Err(SealError::EmptyInput)
        ));
        assert!(matches!(
            InvocationRequest::new(Mode::Decrypt, " \n\t "),
            Err(SealError::EmptyInput)
        ));
    }

    #[test]
    fn test_keeps_input_verbatim() {
        let req = InvocationRequest::new(Mode::Encrypt, "  hunter2\n").unwrap();
        assert_eq!(req.input_text, "  hunter2\n");
        assert!(req.working_directory.is_none());
    }

    #[test]
    fn test_trims_one_newline_only() {
        assert_eq!(trim_trailing_newline("abc\n".into()), "abc");
        assert_eq!(trim_trailing_newline("abc\r\n".into()), "abc");
        assert_eq!(trim_trailing_newline("abc\n\n".into()), "abc\n");
        assert_eq!(trim_trailing_newline("abc".into()), "abc");
    }

    #[test]
    fn test_nonzero_exit_is_tool_error() {
        let result = InvocationResult {
            exit_code: 1,
            stdout: String::new(),
            stderr: "boom\n".to_string(),
        };
        match result.into_output() {
            Err(SealError::ExternalTool { code, stderr }) => {
                assert_eq!(code, 1);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
