//! Date discovery for gazette issues.
//!
//! Issue headers and signature blocks carry dates in several layouts:
//! numeric day and month ("12.12.2012"), or a numeric day with a Greek
//! month name in genitive or abbreviated form ("12 Δεκεμβρίου 2012").
//! The year is optional in running text.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Date pattern without capture groups, for composition into larger
/// patterns (e.g. legislative-act citations).
pub const DATE_PATTERN: &str = "(?:3[01]|[12][0-9]|0?[1-9])[-/.\\s]+\
(?:1[0-2]|0?[1-9]|Ιανουαρίου|Φεβρουαρίου|Μαρτίου|Απριλίου|Μαΐου|Ιουνίου|Ιουλίου|Αυγούστου\
|Σεπτεμβρίου|Οκτωβρίου|Νοεμβρίου|Δεκεμβρίου|Ιαν|Φεβ|Μαρ|Απρ|Μαϊ|Ιουν|Ιουλ|Αυγ|Σεπτ|Οκτ|Νοε|Δεκ)\
(?:[-/.\\s]+(?:1[0-9][0-9][0-9]|20[0-9][0-8]))?";

/// Capturing form of [`DATE_PATTERN`].
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "(?P<day>3[01]|[12][0-9]|0?[1-9])[-/.\\s]+\
(?P<month>1[0-2]|0?[1-9]|Ιανουαρίου|Φεβρουαρίου|Μαρτίου|Απριλίου|Μαΐου|Ιουνίου|Ιουλίου|Αυγούστου\
|Σεπτεμβρίου|Οκτωβρίου|Νοεμβρίου|Δεκεμβρίου|Ιαν|Φεβ|Μαρ|Απρ|Μαϊ|Ιουν|Ιουλ|Αυγ|Σεπτ|Οκτ|Νοε|Δεκ)\
(?:[-/.\\s]+(?P<year>1[0-9][0-9][0-9]|20[0-9][0-8]))?",
    )
    .expect("valid regex")
});

/// Month-name prefixes mapped to month numbers.
///
/// Prefix matching covers both the genitive forms and the gazette
/// abbreviations (Μαΐου and Μαϊ both resolve to 5).
const MONTH_PREFIXES: [(&str, u32); 13] = [
    ("Ιαν", 1),
    ("Φεβ", 2),
    ("Μαρ", 3),
    ("Απρ", 4),
    ("Μαΐ", 5),
    ("Μαϊ", 5),
    ("Ιουν", 6),
    ("Ιουλ", 7),
    ("Αυγ", 8),
    ("Σεπ", 9),
    ("Οκτ", 10),
    ("Νοε", 11),
    ("Δεκ", 12),
];

/// One date occurrence in an issue line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMatch {
    /// Day of month, 1-31.
    pub day: u32,

    /// Month number, 1-12, with names resolved via the prefix table.
    pub month: u32,

    /// Year, when the text carries one.
    pub year: Option<i32>,

    /// The matched text, kept for diagnostics.
    pub raw: String,
}

impl DateMatch {
    /// Calendar date, when the match carries a year and forms a real date.
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month, self.day)
    }
}

/// Resolve a month token (numeral or name) to its number.
#[must_use]
pub fn month_number(token: &str) -> Option<u32> {
    if let Ok(n) = token.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    MONTH_PREFIXES
        .iter()
        .find(|(prefix, _)| token.starts_with(prefix))
        .map(|(_, n)| *n)
}

/// All date matches in a single line, in order.
#[must_use]
pub fn scan_line(line: &str) -> Vec<DateMatch> {
    DATE_CAPTURE
        .captures_iter(line)
        .filter_map(|caps| {
            let day = caps.name("day")?.as_str().parse().ok()?;
            let month = month_number(caps.name("month")?.as_str())?;
            let year = caps
                .name("year")
                .and_then(|y| y.as_str().parse::<i32>().ok());
            Some(DateMatch {
                day,
                month,
                year,
                raw: caps.get(0)?.as_str().to_string(),
            })
        })
        .collect()
}

/// Scan all lines, returning `(line_index, match)` pairs in order.
#[must_use]
pub fn scan_lines(lines: &[String]) -> Vec<(usize, DateMatch)> {
    let mut found = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        for m in scan_line(line) {
            found.push((i, m));
        }
    }
    found
}
