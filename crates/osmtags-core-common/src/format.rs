//! Read errors shared by the format crates.

use std::fmt;

use thiserror::Error;

/// Where in a source file a record starts. Lines and records count from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number in the source (1-based)
    pub line: Option<u64>,
    /// Logical record number reported by the parser
    pub record: Option<u64>,
    /// Byte offset from the start of the source
    pub byte_offset: Option<u64>,
}

impl SourcePosition {
    /// Returns true when the position does not contain any location metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.record.is_none() && self.byte_offset.is_none()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            ("line", self.line),
            ("record", self.record),
            ("byte", self.byte_offset),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label} {v}")))
        .collect();

        if parts.is_empty() {
            f.write_str("unknown position")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Failure to turn a file into a layer.
#[derive(Debug, Error)]
pub enum FormatReadError {
    #[error("I/O error{}: {source}", while_reading(.context))]
    Io {
        source: std::io::Error,
        /// What was being read, usually the path
        context: Option<String>,
    },
    /// The bytes are not valid for the format.
    #[error("Parse error{}{}: {message}", while_reading(.context), at(.position))]
    Parse {
        message: String,
        /// Where in the source parsing stopped, when the parser knows
        position: Option<SourcePosition>,
        /// What was being read, usually the path
        context: Option<String>,
    },
}

impl FormatReadError {
    /// Parse error without a position.
    #[must_use]
    pub fn parse(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position: None,
            context: Some(context.into()),
        }
    }
}

fn while_reading(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|c| format!(" while reading {c}"))
        .unwrap_or_default()
}

fn at(position: &Option<SourcePosition>) -> String {
    match position {
        Some(pos) if !pos.is_empty() => format!(" at {pos}"),
        _ => String::new(),
    }
}

/// Result type alias that uses [`FormatReadError`].
pub type FormatResult<T> = Result<T, FormatReadError>;
