//! Error types for the parser.
//!
//! Every "not found" outcome is an explicit variant rather than a caught
//! panic or sentinel value. Only `NoDateFound` is fatal to an issue; the
//! remaining variants are recoverable at the article or candidate level.

use thiserror::Error;

/// Main error type for the parser library.
#[derive(Debug, Error)]
pub enum ParserError {
    /// No line of the issue matched the date pattern.
    #[error("No parseable date found in issue '{issue}'")]
    NoDateFound { issue: String },

    /// A quote glyph was left unpaired inside an article body.
    #[error("Unmatched quote glyph in article '{article}' at byte offset {offset}")]
    UnmatchedQuote { article: String, offset: usize },

    /// No target keyword within the search window of an action verb.
    #[error("No target keyword within {window} tokens of action '{action}'")]
    TargetKeywordNotFound { action: String, window: usize },

    /// No statute identifier could be resolved for a candidate tree.
    #[error("No statute identifier resolved for action '{action}' in article '{article}'")]
    IdentifierNotResolved { action: String, article: String },
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;
