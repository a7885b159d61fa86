//! Error types for layout primitive parsing.

use thiserror::Error;

/// Errors raised when parsing layout primitives from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An edge list had the wrong number of components.
    #[error("Invalid edges '{input}': expected 1, 2 or 4 comma-separated values, got {count}")]
    EdgeCount {
        /// The text that failed to parse.
        input: String,
        /// Number of components found.
        count: usize,
    },

    /// An edge component was not an integer.
    #[error("Invalid edge value '{value}' in '{input}'")]
    EdgeValue {
        /// The text that failed to parse.
        input: String,
        /// The offending component.
        value: String,
    },

    /// A length was not `content`, `stretch`, `<n>px` or `<n>%`.
    #[error("Invalid length '{0}': expected 'content', 'stretch', '<n>px' or '<n>%'")]
    Length(String),

    /// An alignment or orientation keyword was not recognized.
    #[error("Unknown {kind} '{value}'")]
    UnknownKeyword {
        /// What was being parsed.
        kind: &'static str,
        /// The unrecognized text.
        value: String,
    },
}

/// Result type for core parsing operations.
pub type CoreResult<T> = Result<T, CoreError>;
