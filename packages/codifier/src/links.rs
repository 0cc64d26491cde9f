//! Cross-reference link graph.
//!
//! Scans every paragraph of every version of every law for statute
//! mentions and classifies each mention's relation to the mentioning
//! law: modifying (the surrounding prose carries an amendment verb),
//! referential (plain citation, or any mention inside quoted text), or
//! general (fallback when quote pairing fails for the paragraph).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use nomothesia_parser::segmenter::partition_quoted;
use nomothesia_parser::text;
use nomothesia_parser::vocab::Vocabulary;

use crate::law::Law;

/// Relation of a mention to the mentioning law.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// The surrounding prose amends the mentioned statute.
    #[strum(serialize = "τροποποιητικός")]
    Modifying,

    /// Plain citation, including any mention inside quoted text.
    #[strum(serialize = "αναφορικός")]
    Referential,

    /// Classification fallback when quote pairing failed.
    #[strum(serialize = "γενικός")]
    General,
}

/// Application status of a linked amendment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Recorded but not yet applied to the corpus.
    #[strum(serialize = "μη εφαρμοσμένος")]
    Pending,

    /// Applied to the corpus.
    #[strum(serialize = "εφαρμοσμένος")]
    Applied,
}

/// One provenance-tagged mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Identifier of the mentioning law.
    pub from: String,

    /// Paragraph text the mention originated from.
    pub text: String,

    pub link_type: LinkType,

    pub status: LinkStatus,
}

/// All recorded mentions of one statute. Accumulates across parses;
/// entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Canonical identifier of the mentioned statute.
    pub identifier: String,

    /// Distinct laws that ever linked here.
    pub links_to: BTreeSet<String>,

    /// Ordered mention entries.
    pub actual_links: Vec<LinkEntry>,
}

impl Link {
    /// An empty link record.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            links_to: BTreeSet::new(),
            actual_links: Vec::new(),
        }
    }

    /// Append one mention entry.
    pub fn add_link(&mut self, from: &str, text: &str, link_type: LinkType) {
        self.links_to.insert(from.to_string());
        self.actual_links.push(LinkEntry {
            from: from.to_string(),
            text: text.to_string(),
            link_type,
            status: LinkStatus::Pending,
        });
    }

    /// Order entries chronologically by the statute year parsed from
    /// `from`, falling back to lexicographic order when any entry's
    /// identifier does not parse.
    pub fn sort_entries(&mut self) {
        let all_parse = self
            .actual_links
            .iter()
            .all(|e| text::statute_year(&e.from).is_some());
        if all_parse {
            self.actual_links
                .sort_by_key(|e| text::statute_year(&e.from));
        } else {
            self.actual_links.sort_by(|a, b| a.from.cmp(&b.from));
        }
    }

    /// Group entries by originating text, for presentation.
    #[must_use]
    pub fn by_text(&self) -> BTreeMap<&str, Vec<&LinkEntry>> {
        let mut grouped: BTreeMap<&str, Vec<&LinkEntry>> = BTreeMap::new();
        for entry in &self.actual_links {
            grouped.entry(entry.text.as_str()).or_default().push(entry);
        }
        grouped
    }
}

/// Out-degree statistics over the whole graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeStats {
    pub max: usize,
    pub average: f64,
}

/// Directed multigraph of statute mentions, keyed by the mentioned
/// identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraph {
    links: BTreeMap<String, Link>,
}

impl LinkGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every paragraph of every version of `law` for statute
    /// mentions and record them.
    pub fn scan_law(&mut self, law: &Law, vocab: &Vocabulary) {
        for version in law.history() {
            for paragraphs in version.articles.values() {
                for units in paragraphs.values() {
                    let paragraph_text = units.join(". ");
                    self.scan_paragraph(&law.identifier, &paragraph_text, vocab);
                }
            }
        }
    }

    fn scan_paragraph(&mut self, from: &str, paragraph: &str, vocab: &Vocabulary) {
        match partition_quoted(from, paragraph, 0) {
            Ok(partition) => {
                for span in &partition.non_extracts {
                    let mentions = dedupe(vocab.find_statutes(span));
                    if mentions.is_empty() {
                        continue;
                    }
                    // A mention next to an amendment verb is acted
                    // upon, not merely cited.
                    let link_type = if vocab.contains_action(span) {
                        LinkType::Modifying
                    } else {
                        LinkType::Referential
                    };
                    for mention in mentions {
                        self.entry(&mention).add_link(from, paragraph, link_type);
                    }
                }
                for span in &partition.extracts {
                    for mention in dedupe(vocab.find_statutes(span)) {
                        self.entry(&mention)
                            .add_link(from, paragraph, LinkType::Referential);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(from = %from, error = %e, "quote pairing failed; mentions classified general");
                for mention in dedupe(vocab.find_statutes(paragraph)) {
                    self.entry(&mention)
                        .add_link(from, paragraph, LinkType::General);
                }
            }
        }
    }

    fn entry(&mut self, identifier: &str) -> &mut Link {
        self.links
            .entry(identifier.to_string())
            .or_insert_with(|| Link::new(identifier))
    }

    /// Look up a link record.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&Link> {
        self.links.get(identifier)
    }

    /// Insert or replace a link record loaded from a store.
    pub fn insert(&mut self, link: Link) {
        self.links.insert(link.identifier.clone(), link);
    }

    /// All link records, keyed by mentioned identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Maximum and average out-degree, or none for an empty graph.
    #[must_use]
    pub fn degree_stats(&self) -> Option<DegreeStats> {
        if self.links.is_empty() {
            return None;
        }
        let degrees: Vec<usize> = self.links.values().map(|l| l.links_to.len()).collect();
        let max = degrees.iter().copied().max().unwrap_or(0);
        let sum: usize = degrees.iter().sum();
        Some(DegreeStats {
            max,
            average: sum as f64 / degrees.len() as f64,
        })
    }
}

fn dedupe(mentions: Vec<String>) -> BTreeSet<String> {
    mentions.into_iter().collect()
}
