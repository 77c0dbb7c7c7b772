//! Text buffers and selections

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SealError};

/// A byte range `start..end` inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for Selection {
    type Err = String;

    /// Parse `START:END`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("expected START:END, got '{}'", s))?;
        let start = start
            .trim()
            .parse()
            .map_err(|_| format!("bad start offset '{}'", start))?;
        let end = end
            .trim()
            .parse()
            .map_err(|_| format!("bad end offset '{}'", end))?;
        Ok(Self { start, end })
    }
}

/// The full text a command works on
#[derive(Debug, Clone)]
pub struct Buffer {
    text: String,
}

impl Buffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The selected text, or the whole buffer without a selection
    pub fn selected(&self, selection: Option<Selection>) -> Result<&str> {
        match selection {
            None => Ok(&self.text),
            Some(sel) => {
                self.check(sel)?;
                Ok(&self.text[sel.start..sel.end])
            }
        }
    }

    /// A copy of the buffer with the selection (or everything) replaced
    pub fn replace(&self, selection: Option<Selection>, with: &str) -> Result<String> {
        match selection {
            None => Ok(with.to_string()),
            Some(sel) => {
                self.check(sel)?;
                let mut out = String::with_capacity(self.text.len() - (sel.end - sel.start) + with.len());
                out.push_str(&self.text[..sel.start]);
                out.push_str(with);
                out.push_str(&self.text[sel.end..]);
                Ok(out)
            }
        }
    }

    fn check(&self, sel: Selection) -> Result<()> {
        if sel.start > sel.end || sel.end > self.text.len() {
            return Err(SealError::InvalidSelection(format!(
                "{} is outside the buffer (length {})",
                sel,
                self.text.len()
            )));
        }
        if !self.text.is_char_boundary(sel.start) || !self.text.is_char_boundary(sel.end) {
            return Err(SealError::InvalidSelection(format!(
                "{} splits a UTF-8 character",
                sel
            )));
        }
        Ok(())
    }
}
