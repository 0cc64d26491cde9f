//! Configuration constants and tunables for segmentation and tree
//! generation.
//!
//! The markers and thresholds below describe the Government Gazette
//! (ΦΕΚ) text layout. They are collected into plain config structs so
//! callers inject them explicitly instead of reaching for process-wide
//! state.

/// Minimum extract length in characters, quote glyphs included.
///
/// Quoted spans shorter than this are treated as incidental quotations
/// (cited phrases, titles) rather than reproduced statutory text.
pub const MIN_EXTRACT_CHARS: usize = 100;

/// Marker word opening an article section.
pub const ARTICLE_MARKER: &str = "Άρθρο";

/// Line prefix of the presidential signature section that terminates the
/// amendment body of an issue.
pub const SIGNATURE_MARKER: &str = "Ο Πρόεδρος της Δημοκρατίας";

/// Page-header prefix dropped during line normalization.
pub const PAGE_HEADER_MARKER: &str = "Τεύχος";

/// Forward token window searched for a target keyword after an action verb.
pub const MAX_WHAT_WINDOW: usize = 20;

/// Reverse token window, kept for symmetry with the forward search.
///
/// The documented control flow never reaches the backward branch; see
/// DESIGN.md before wiring it up.
pub const MAX_WHERE_WINDOW: usize = 30;

/// Tunables for [`crate::segmenter`].
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Minimum extract length in characters (glyphs included).
    pub min_extract_chars: usize,

    /// Line prefix that opens an article section.
    pub article_marker: String,

    /// Line prefix of the presidential signature section.
    pub signature_marker: String,

    /// Line prefix of repeated page headers.
    pub page_header_marker: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_extract_chars: MIN_EXTRACT_CHARS,
            article_marker: ARTICLE_MARKER.to_string(),
            signature_marker: SIGNATURE_MARKER.to_string(),
            page_header_marker: PAGE_HEADER_MARKER.to_string(),
        }
    }
}

/// Tunables for [`crate::generator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Forward window (in tokens) for the target-keyword search.
    pub max_what_window: usize,

    /// Reverse window, currently unused by the forward-only search.
    pub max_where_window: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_what_window: MAX_WHAT_WINDOW,
            max_where_window: MAX_WHERE_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmenter_config_defaults() {
        let config = SegmenterConfig::default();
        assert_eq!(config.min_extract_chars, 100);
        assert_eq!(config.article_marker, "Άρθρο");
        assert_eq!(config.page_header_marker, "Τεύχος");
    }

    #[test]
    fn test_generator_config_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.max_what_window, 20);
        assert_eq!(config.max_where_window, 30);
    }
}
