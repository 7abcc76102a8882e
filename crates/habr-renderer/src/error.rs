//! Conversion error types.

use std::path::PathBuf;

/// Error that aborts a conversion.
///
/// Every variant is terminal: the pipeline never produces partial output.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Image side-file is missing, unreadable or not exactly two lines.
    #[error("Malformed side-file {}: {reason}", path.display())]
    MalformedSideFile {
        /// Path of the side-file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Code block language is not known to the highlighter.
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    /// Input is not valid UTF-8.
    #[error("Input is not valid UTF-8: {0}")]
    MalformedInputEncoding(#[from] std::str::Utf8Error),

    /// Highlighter failed while tokenizing a code block.
    #[error("Highlighting failed: {0}")]
    Highlight(String),

    /// Highlighting theme is not available.
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}

impl From<syntect::parsing::ParsingError> for ConvertError {
    fn from(err: syntect::parsing::ParsingError) -> Self {
        Self::Highlight(err.to_string())
    }
}

impl From<syntect::parsing::ScopeError> for ConvertError {
    fn from(err: syntect::parsing::ScopeError) -> Self {
        Self::Highlight(format!("{err:?}"))
    }
}

impl From<syntect::parsing::ParseScopeError> for ConvertError {
    fn from(err: syntect::parsing::ParseScopeError) -> Self {
        Self::Highlight(format!("{err:?}"))
    }
}
