//! Small text utilities shared by the segmenter and the generator.

use regex::Regex;
use std::sync::LazyLock;

/// Year component of a statute identifier, e.g. "1991" in "ν. 1920/1991".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static STATUTE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(1[0-9]{3}|20[0-9]{2})\b").expect("valid regex"));

/// Characters stripped from token boundaries.
///
/// Covers ASCII punctuation plus the Greek quotation and list glyphs
/// that survive PDF extraction.
fn is_token_punct(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '«' | '»' | '·' | '’' | '‘' | '“' | '”' | '΄' | '–' | '—')
}

/// Strip surrounding punctuation from a single token.
#[must_use]
pub fn strip_punct(token: &str) -> &str {
    token.trim_matches(is_token_punct)
}

/// Split on whitespace and strip surrounding punctuation per token.
///
/// Empty results of stripping (tokens that were pure punctuation) are
/// kept as empty strings so token indices line up with the raw split —
/// the generator records positions into this stream.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().map(strip_punct).collect()
}

/// Whether a token carries at least one decimal digit.
#[must_use]
pub fn has_digit(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

/// Extract the publication year from a statute identifier, if present.
///
/// # Examples
/// ```
/// use nomothesia_parser::text::statute_year;
///
/// assert_eq!(statute_year("ν. 1920/1991"), Some(1991));
/// assert_eq!(statute_year("π.δ. 34/2001"), Some(2001));
/// assert_eq!(statute_year("άγνωστο"), None);
/// ```
#[must_use]
pub fn statute_year(identifier: &str) -> Option<i32> {
    STATUTE_YEAR
        .captures(identifier)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
