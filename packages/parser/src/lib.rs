//! Nomothesia Parser - Segment Greek Government Gazette issues and
//! parse amendment instructions.
//!
//! This crate covers the pure, stateless half of the codification
//! pipeline: raw issue text goes in, segmented issues and typed action
//! trees come out. Applying trees to versioned statutes and building
//! the link graph live in the companion `nomothesia-codifier` crate.
//!
//! # Example
//!
//! ```
//! use nomothesia_parser::config::SegmenterConfig;
//! use nomothesia_parser::segmenter::Issue;
//!
//! let text = "Αθήνα, 4 Φεβρουαρίου 1991\nΆρθρο 1\nκείμενο άρθρου\n";
//! let issue = Issue::segment("fek.txt", text, &SegmenterConfig::default()).unwrap();
//! assert_eq!(issue.headings().count(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Thresholds, markers, and window sizes
//! - [`vocab`]: Action-verb/target-keyword tables and identifier regex families
//! - [`dates`]: Multi-format date discovery
//! - [`text`]: Tokenization helpers
//! - [`error`]: Error types and Result alias
//! - [`segmenter`]: Issue segmentation and extract/non-extract partition
//! - [`generator`]: Action-tree generation

pub mod config;
pub mod dates;
pub mod error;
pub mod generator;
pub mod segmenter;
pub mod text;
pub mod vocab;

// Re-export commonly used items
pub use config::{GeneratorConfig, SegmenterConfig};
pub use error::{ParserError, Result};
pub use generator::{generate, ActionTree, LawNode, PhraseEdit, PhraseLocation, WhatNode};
pub use segmenter::{ExtractCursor, Issue, QuoteSpan};
pub use vocab::{ActionKind, TargetKind, Vocabulary};
