//! Issue segmentation.
//!
//! Turns raw gazette text into an [`Issue`]: discovered dates, an
//! article map, and per-article quote (extract) spans with their
//! non-extract complements. Segmentation is pure — it reads the text
//! and the injected configuration and produces an immutable value.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config::SegmenterConfig;
use crate::dates::{self, DateMatch};
use crate::error::{ParserError, Result};
use crate::vocab::Vocabulary;

const OPEN_QUOTE: char = '«';
const CLOSE_QUOTE: char = '»';

/// One paired quote span inside an article body.
///
/// Byte offsets into the body: `start` sits on the opening glyph, `end`
/// just past the closing glyph, so the complement of the spans plus the
/// spans themselves reconstructs the body exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSpan {
    pub start: usize,
    pub end: usize,
}

impl QuoteSpan {
    /// Quoted text between the glyphs.
    #[must_use]
    pub fn interior<'a>(&self, body: &'a str) -> &'a str {
        &body[self.start + OPEN_QUOTE.len_utf8()..self.end - CLOSE_QUOTE.len_utf8()]
    }

    /// Span text including both glyphs.
    #[must_use]
    pub fn full<'a>(&self, body: &'a str) -> &'a str {
        &body[self.start..self.end]
    }

    fn char_len(&self, body: &str) -> usize {
        self.full(body).chars().count()
    }
}

/// Pair quote glyphs with a two-state automaton.
///
/// Walking the merged glyph offsets in order: a closing glyph while
/// expecting an opener is skipped, as is an opening glyph while a span
/// is already open. A span left open at the end of the text is an
/// [`ParserError::UnmatchedQuote`] for the given context.
///
/// Pairs shorter than `min_chars` characters (glyphs included) are
/// dropped as incidental quotations. The result is ordered by start
/// offset and non-overlapping by construction.
pub fn quote_spans(context: &str, text: &str, min_chars: usize) -> Result<Vec<QuoteSpan>> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (offset, ch) in text.char_indices() {
        match ch {
            OPEN_QUOTE if open.is_none() => open = Some(offset),
            CLOSE_QUOTE => {
                if let Some(start) = open.take() {
                    spans.push(QuoteSpan {
                        start,
                        end: offset + CLOSE_QUOTE.len_utf8(),
                    });
                }
            }
            _ => {}
        }
    }

    if let Some(offset) = open {
        return Err(ParserError::UnmatchedQuote {
            article: context.to_string(),
            offset,
        });
    }

    spans.retain(|s| s.char_len(text) >= min_chars);
    Ok(spans)
}

/// Extract/non-extract partition of a flat piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePartition<'a> {
    /// Interior text of each quote pair, in order.
    pub extracts: Vec<&'a str>,

    /// Text before, strictly between, and after the pairs.
    pub non_extracts: Vec<&'a str>,
}

/// Partition `text` into quoted and unquoted spans.
///
/// Used by the link builder on paragraph text; segmentation itself goes
/// through [`Issue`].
pub fn partition_quoted<'a>(
    context: &str,
    text: &'a str,
    min_chars: usize,
) -> Result<QuotePartition<'a>> {
    let spans = quote_spans(context, text, min_chars)?;
    Ok(QuotePartition {
        extracts: spans.iter().map(|s| s.interior(text)).collect(),
        non_extracts: complement(text, &spans),
    })
}

fn complement<'a>(body: &'a str, spans: &[QuoteSpan]) -> Vec<&'a str> {
    let Some(first) = spans.first() else {
        // No surviving pairs: the whole body is one unquoted span.
        return vec![body];
    };
    let mut out = vec![&body[..first.start]];
    for pair in spans.windows(2) {
        out.push(&body[pair[0].end..pair[1].start]);
    }
    if let Some(last) = spans.last() {
        out.push(&body[last.end..]);
    }
    out
}

/// Sequential content cursor over an article's extracts.
///
/// The generator consumes one extract per resolved content-bearing
/// edit, in document order.
#[derive(Debug)]
pub struct ExtractCursor<'a> {
    body: &'a str,
    spans: &'a [QuoteSpan],
    pos: usize,
}

impl<'a> ExtractCursor<'a> {
    /// Cursor over explicit spans; mostly useful in tests and tools.
    #[must_use]
    pub fn over(body: &'a str, spans: &'a [QuoteSpan]) -> Self {
        Self {
            body,
            spans,
            pos: 0,
        }
    }

    /// The next unconsumed extract, if any.
    pub fn next_content(&mut self) -> Option<&'a str> {
        let span = self.spans.get(self.pos)?;
        self.pos += 1;
        Some(span.interior(self.body))
    }

    /// Extracts not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.spans.len() - self.pos
    }
}

/// A segmented gazette issue. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Source name, usually the originating filename.
    pub name: String,

    /// Normalized, filtered lines.
    pub lines: Vec<String>,

    /// Publication date from the first dated line carrying a year.
    pub issue_date: NaiveDate,

    /// Last date match in the issue. Heuristically the signature date;
    /// the final dated line is not guaranteed to be one.
    pub signed_date: DateMatch,

    articles: BTreeMap<String, String>,
    extracts: BTreeMap<String, Vec<QuoteSpan>>,
    sentences: BTreeMap<String, Vec<Vec<String>>>,
}

impl Issue {
    /// Segment raw issue text.
    ///
    /// Normalization: NFC; a line ending in a soft hyphen is merged
    /// with the next; empty lines and page headers are dropped.
    ///
    /// # Errors
    /// [`ParserError::NoDateFound`] when no line carries a full date.
    pub fn segment(name: impl Into<String>, raw: &str, config: &SegmenterConfig) -> Result<Issue> {
        let name = name.into();
        let normalized: String = raw.nfc().collect();

        let mut lines: Vec<String> = Vec::new();
        for raw_line in normalized.lines() {
            let line = raw_line.trim_end();
            if line.is_empty() || line.starts_with(&config.page_header_marker) {
                continue;
            }
            // A trailing hyphen marks a word split across lines; the
            // body concatenation below re-joins it without a space.
            match line.strip_suffix('-') {
                Some(stem) => lines.push(stem.to_string()),
                None => lines.push(format!("{line} ")),
            }
        }

        let date_matches = dates::scan_lines(&lines);
        let issue_date = date_matches
            .iter()
            .find_map(|(_, m)| m.to_date())
            .ok_or_else(|| ParserError::NoDateFound {
                issue: name.clone(),
            })?;
        let signed_date = date_matches
            .last()
            .map(|(_, m)| m.clone())
            .ok_or_else(|| ParserError::NoDateFound {
                issue: name.clone(),
            })?;

        let articles = find_articles(&lines, config);

        let mut extracts = BTreeMap::new();
        let mut sentences = BTreeMap::new();
        for (heading, body) in &articles {
            let spans = match quote_spans(heading, body, config.min_extract_chars) {
                Ok(spans) => spans,
                Err(e) => {
                    tracing::warn!(issue = %name, article = %heading, error = %e, "quote pairing failed; article keeps no extracts");
                    Vec::new()
                }
            };
            extracts.insert(heading.clone(), spans);
            sentences.insert(heading.clone(), tabulate_sentences(body));
        }

        Ok(Issue {
            name,
            lines,
            issue_date,
            signed_date,
            articles,
            extracts,
            sentences,
        })
    }

    /// Article headings in order.
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.articles.keys().map(String::as_str)
    }

    /// Body text of an article.
    #[must_use]
    pub fn body(&self, heading: &str) -> Option<&str> {
        self.articles.get(heading).map(String::as_str)
    }

    /// Quote spans of an article, ordered by start offset.
    #[must_use]
    pub fn quote_spans_of(&self, heading: &str) -> &[QuoteSpan] {
        self.extracts.get(heading).map_or(&[], Vec::as_slice)
    }

    /// Quoted interiors of an article, as a fresh iterator.
    pub fn extracts(&self, heading: &str) -> impl Iterator<Item = &str> {
        let body = self.body(heading).unwrap_or("");
        self.quote_spans_of(heading)
            .iter()
            .map(move |s| s.interior(body))
    }

    /// Sequential content cursor over an article's extracts.
    #[must_use]
    pub fn extract_cursor(&self, heading: &str) -> ExtractCursor<'_> {
        ExtractCursor::over(
            self.body(heading).unwrap_or(""),
            self.quote_spans_of(heading),
        )
    }

    /// Non-extract spans of an article: before the first pair, every
    /// gap between consecutive pairs, and after the last. An article
    /// without surviving pairs yields its whole body as the single
    /// non-extract span.
    #[must_use]
    pub fn non_extracts(&self, heading: &str) -> Vec<&str> {
        let Some(body) = self.body(heading) else {
            return Vec::new();
        };
        complement(body, self.quote_spans_of(heading))
    }

    /// Tokenized sentence table of an article.
    #[must_use]
    pub fn sentences(&self, heading: &str) -> &[Vec<String>] {
        self.sentences.get(heading).map_or(&[], Vec::as_slice)
    }

    /// All sentence token lists across articles.
    pub fn all_sentences(&self) -> impl Iterator<Item = &Vec<String>> {
        self.sentences.values().flatten()
    }

    /// Headings of articles whose body mentions `identifier`.
    #[must_use]
    pub fn find_statute(&self, identifier: &str) -> Vec<&str> {
        self.articles
            .iter()
            .filter(|(_, body)| body.contains(identifier))
            .map(|(heading, _)| heading.as_str())
            .collect()
    }

    /// Canonical identifiers of statutes announced by this issue.
    ///
    /// A heading like "ΝΟΜΟΣ ΥΠ’ ΑΡΙΘΜ. 4009" in an issue dated 2011
    /// yields "ν. 4009/2011".
    #[must_use]
    pub fn detect_new_laws(&self, vocab: &Vocabulary) -> Vec<String> {
        let mut found = Vec::new();
        for line in &self.lines {
            if let Some(number) = vocab.new_statute_number(line) {
                let identifier = format!("ν. {}/{}", number, self.issue_date.year());
                if !found.contains(&identifier) {
                    found.push(identifier);
                }
            }
        }
        found
    }
}

/// Collect article sections from marker lines.
///
/// A line starting with the article marker or the signature marker
/// begins a section; the body is everything strictly between markers
/// (or to the end of the document). The signature section itself is
/// excluded from the map.
fn find_articles(lines: &[String], config: &SegmenterConfig) -> BTreeMap<String, String> {
    let mut markers: Vec<(usize, String)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with(&config.article_marker) || line.starts_with(&config.signature_marker) {
            markers.push((i, line.trim().to_string()));
        }
    }

    let mut articles = BTreeMap::new();
    for (k, (index, heading)) in markers.iter().enumerate() {
        if heading.starts_with(&config.signature_marker) {
            continue;
        }
        let end = markers.get(k + 1).map_or(lines.len(), |(j, _)| *j);
        let body: String = lines[index + 1..end].concat();
        articles.insert(heading.clone(), body);
    }
    articles
}

/// Split a body into whitespace-token lists per sentence.
///
/// The body is stripped of surrounding hyphens, split on periods, and
/// each piece has punctuation removed before tokenization.
fn tabulate_sentences(body: &str) -> Vec<Vec<String>> {
    body.trim_matches('-')
        .split('.')
        .map(|sentence| {
            sentence
                .chars()
                .map(|c| {
                    if c.is_alphanumeric() || c.is_whitespace() {
                        c
                    } else {
                        ' '
                    }
                })
                .collect::<String>()
                .split_whitespace()
                .map(String::from)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn long_extract(label: &str) -> String {
        format!("{label} {}", "κείμενο ".repeat(20))
    }

    fn sample_issue_text() -> String {
        let extract = long_extract("Νέο κείμενο παραγράφου:");
        format!(
            "Τεύχος Α' 101/1991\n\
             ΕΦΗΜΕΡΙΣ ΤΗΣ ΚΥΒΕΡΝΗΣΕΩΣ\n\
             Αθήνα, 4 Φεβρουαρίου 1991\n\
             \n\
             Άρθρο 1\n\
             Στο άρθρο 5 του ν. 1920/1991 προστίθεται παράγραφος 4 ως εξής: «{extract}» και ισχύει άμεσα.\n\
             Άρθρο 2\n\
             Απλό κείμενο χωρίς αποσπάσματα.\n\
             Ο Πρόεδρος της Δημοκρατίας\n\
             Αθήνα, 28 Φεβρουαρίου 1991\n"
        )
    }

    #[test]
    fn test_segment_dates() {
        let issue =
            Issue::segment("a.txt", &sample_issue_text(), &SegmenterConfig::default()).unwrap();
        assert_eq!(issue.issue_date, NaiveDate::from_ymd_opt(1991, 2, 4).unwrap());
        assert_eq!(issue.signed_date.day, 28);
        assert_eq!(issue.signed_date.month, 2);
    }

    #[test]
    fn test_no_date_is_fatal() {
        let err = Issue::segment("b.txt", "Άρθρο 1\nκείμενο\n", &SegmenterConfig::default())
            .unwrap_err();
        assert!(matches!(err, ParserError::NoDateFound { .. }));
    }

    #[test]
    fn test_article_discovery_excludes_signature_section() {
        let issue =
            Issue::segment("a.txt", &sample_issue_text(), &SegmenterConfig::default()).unwrap();
        let headings: Vec<_> = issue.headings().collect();
        assert_eq!(headings, vec!["Άρθρο 1", "Άρθρο 2"]);
        assert!(issue.body("Άρθρο 2").unwrap().contains("χωρίς αποσπάσματα"));
        // The signature block's own line is not part of any body.
        assert!(!issue.body("Άρθρο 2").unwrap().contains("Πρόεδρος"));
    }

    #[test]
    fn test_page_headers_dropped() {
        let issue =
            Issue::segment("a.txt", &sample_issue_text(), &SegmenterConfig::default()).unwrap();
        assert!(issue.lines.iter().all(|l| !l.starts_with("Τεύχος")));
    }

    #[test]
    fn test_hyphen_join() {
        let text = "Αθήνα, 1.2.2000\nΆρθρο 1\nπαρά-\nγραφος τέλος\n";
        let issue = Issue::segment("h.txt", text, &SegmenterConfig::default()).unwrap();
        assert!(issue.body("Άρθρο 1").unwrap().contains("παράγραφος"));
    }

    #[test]
    fn test_extracts_found_and_ordered() {
        let issue =
            Issue::segment("a.txt", &sample_issue_text(), &SegmenterConfig::default()).unwrap();
        let extracts: Vec<_> = issue.extracts("Άρθρο 1").collect();
        assert_eq!(extracts.len(), 1);
        assert!(extracts[0].starts_with("Νέο κείμενο παραγράφου:"));
    }

    #[test]
    fn test_short_extracts_dropped_whole_body_is_one_non_extract() {
        // Both quoted spans are below the threshold, so the article has
        // zero extracts and its whole body becomes one non-extract span.
        let text = "Αθήνα, 1.2.2000\nΆρθρο 1\n«Α» κείμενο «Β»\n";
        let issue = Issue::segment("s.txt", text, &SegmenterConfig::default()).unwrap();
        assert_eq!(issue.extracts("Άρθρο 1").count(), 0);
        let spans = issue.non_extracts("Άρθρο 1");
        assert_eq!(spans, vec![issue.body("Άρθρο 1").unwrap()]);
    }

    #[test]
    fn test_unmatched_quote_degrades_article() {
        let text = format!(
            "Αθήνα, 1.2.2000\nΆρθρο 1\nκείμενο «{} χωρίς κλείσιμο\n",
            "α".repeat(120)
        );
        let issue = Issue::segment("u.txt", &text, &SegmenterConfig::default()).unwrap();
        assert_eq!(issue.extracts("Άρθρο 1").count(), 0);
    }

    #[test]
    fn test_quote_spans_skip_stray_glyphs() {
        let text = "» πριν «μέσα» μετά";
        let spans = quote_spans("t", text, 0).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].interior(text), "μέσα");
    }

    #[test]
    fn test_reconstruction_property() {
        let body = format!(
            "πριν «{}» μέση «{}» τέλος",
            "α".repeat(120),
            "β".repeat(120)
        );
        let spans = quote_spans("t", &body, 100).unwrap();
        assert_eq!(spans.len(), 2);
        let gaps = complement(&body, &spans);
        // Interleave complement pieces and full spans.
        let mut rebuilt = String::new();
        rebuilt.push_str(gaps[0]);
        rebuilt.push_str(spans[0].full(&body));
        rebuilt.push_str(gaps[1]);
        rebuilt.push_str(spans[1].full(&body));
        rebuilt.push_str(gaps[2]);
        assert_eq!(rebuilt, body);
    }

    #[test]
    fn test_extract_cursor_consumes_in_order() {
        let body = format!("α «{}» β «{}» γ", "x".repeat(120), "y".repeat(120));
        let spans = quote_spans("t", &body, 100).unwrap();
        let mut cursor = ExtractCursor::over(&body, &spans);
        assert_eq!(cursor.remaining(), 2);
        assert!(cursor.next_content().unwrap().starts_with('x'));
        assert!(cursor.next_content().unwrap().starts_with('y'));
        assert_eq!(cursor.next_content(), None);
    }

    #[test]
    fn test_sentences_tokenized() {
        let issue =
            Issue::segment("a.txt", &sample_issue_text(), &SegmenterConfig::default()).unwrap();
        let sentences = issue.sentences("Άρθρο 2");
        assert!(!sentences.is_empty());
        assert!(sentences[0].contains(&"Απλό".to_string()));
    }

    #[test]
    fn test_find_statute() {
        let issue =
            Issue::segment("a.txt", &sample_issue_text(), &SegmenterConfig::default()).unwrap();
        assert_eq!(issue.find_statute("ν. 1920/1991"), vec!["Άρθρο 1"]);
        assert!(issue.find_statute("ν. 1/2000").is_empty());
    }

    #[test]
    fn test_detect_new_laws() {
        let text = "Αθήνα, 1.2.2011\nΝΟΜΟΣ ΥΠ’ ΑΡΙΘΜ. 4009\nΆρθρο 1\nκείμενο\n";
        let issue = Issue::segment("n.txt", text, &SegmenterConfig::default()).unwrap();
        assert_eq!(
            issue.detect_new_laws(&Vocabulary::greek()),
            vec!["ν. 4009/2011".to_string()]
        );
    }

    #[test]
    fn test_partition_quoted() {
        let text = "πριν «μέσα» μετά";
        let partition = partition_quoted("t", text, 0).unwrap();
        assert_eq!(partition.extracts, vec!["μέσα"]);
        assert_eq!(partition.non_extracts, vec!["πριν ", " μετά"]);
    }
}
