//! Error types for the codifier.
//!
//! Apply-time failures carry the full address that failed to resolve so
//! batch logs are reproducible. No error ever rolls back an already
//! committed version.

use thiserror::Error;

/// Main error type for the codifier library.
#[derive(Debug, Error)]
pub enum CodifierError {
    /// No law with this identifier exists in the corpus.
    #[error("Law not found: {0}")]
    LawNotFound(String),

    /// The addressed article/paragraph does not exist in the current version.
    #[error("Target not found in {law}: article {article:?}, paragraph {paragraph:?}")]
    TargetNotFound {
        law: String,
        article: Option<String>,
        paragraph: Option<u32>,
    },

    /// The tree's law identifier does not match the law being applied to.
    #[error("Ambiguous tree: addressed to '{expected}', applied to '{found}'")]
    AmbiguousTree { expected: String, found: String },

    /// The tree lacks a component its action needs (content, chain node).
    #[error("Incomplete tree for {law}: {reason}")]
    IncompleteTree { law: String, reason: String },

    /// Issue parsing failed; fatal for that issue only.
    #[error("Parse error: {0}")]
    Parse(#[from] nomothesia_parser::ParserError),

    /// IO error from a store backend.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error from a store backend.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for codifier operations.
pub type Result<T> = std::result::Result<T, CodifierError>;
