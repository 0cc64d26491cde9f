//! The versioned law document model.
//!
//! A [`Law`] owns an append-only sequence of [`LawVersion`]s. Applying
//! an action tree never mutates an existing version: the current
//! version's article map is cloned, edited, and pushed as version n+1.
//! The failure of any single edit leaves the history exactly as it was.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use nomothesia_parser::generator::{ActionTree, PhraseEdit, PhraseLocation};
use nomothesia_parser::vocab::{ActionKind, TargetKind};

use crate::error::{CodifierError, Result};

/// Paragraph number → ordered text units (εδάφια).
pub type Paragraphs = BTreeMap<u32, Vec<String>>;

/// Article number → paragraphs.
pub type Articles = BTreeMap<String, Paragraphs>;

/// Leading paragraph marker inside a raw article body ("1. ", "2. ").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARAGRAPH_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\d{1,2})\.\s+").expect("valid regex"));

/// One immutable snapshot of a statute's full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawVersion {
    /// Monotonic, gap-free index; version 0 is the enacted text.
    pub version_index: u32,

    /// Full article tree of this snapshot.
    pub articles: Articles,

    /// Issue that produced this version, when known.
    pub amendee: Option<String>,
}

/// A statute with its complete amendment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Law {
    /// Canonical citation, e.g. "ν. 1920/1991".
    pub identifier: String,

    versions: Vec<LawVersion>,
}

impl Law {
    /// A law with an initial version 0.
    #[must_use]
    pub fn new(identifier: impl Into<String>, articles: Articles, amendee: Option<&str>) -> Self {
        Self {
            identifier: identifier.into(),
            versions: vec![LawVersion {
                version_index: 0,
                articles,
                amendee: amendee.map(String::from),
            }],
        }
    }

    /// A law with no versions yet; the first `apply` creates version 0.
    #[must_use]
    pub fn empty(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            versions: Vec::new(),
        }
    }

    /// Build version 0 from an issue's `heading → body` article map.
    ///
    /// The article number is the second whitespace token of the heading
    /// ("Άρθρο 5" → "5"); headings without one are skipped. Bodies are
    /// split into numbered paragraphs on leading "n." markers.
    #[must_use]
    pub fn from_issue_articles<'a, I>(
        identifier: impl Into<String>,
        articles: I,
        amendee: Option<&str>,
    ) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tree = Articles::new();
        for (heading, body) in articles {
            let Some(number) = heading.split_whitespace().nth(1) else {
                tracing::warn!(heading = %heading, "article heading without a number; skipped");
                continue;
            };
            tree.insert(number.to_string(), split_paragraphs(body));
        }
        Self::new(identifier, tree, amendee)
    }

    /// The current (highest-indexed) version.
    #[must_use]
    pub fn current(&self) -> Option<&LawVersion> {
        self.versions.last()
    }

    /// All versions in increasing `version_index` order.
    #[must_use]
    pub fn history(&self) -> &[LawVersion] {
        &self.versions
    }

    /// Apply one action tree, producing the next version.
    ///
    /// Returns the new version index. Delete edits are
    /// idempotent-detectable: re-applying the same delete fails with
    /// [`CodifierError::TargetNotFound`]. Insert and replace edits are
    /// non-idempotent by design — each application is a new version.
    ///
    /// # Errors
    /// [`CodifierError::AmbiguousTree`] when the tree addresses a
    /// different statute; [`CodifierError::TargetNotFound`] when the
    /// addressed unit does not exist in the current version;
    /// [`CodifierError::IncompleteTree`] when the tree lacks content or
    /// chain nodes its action needs. All failures leave the history
    /// untouched.
    pub fn apply(&mut self, tree: &ActionTree, amendee: Option<&str>) -> Result<u32> {
        if tree.law.identifier != self.identifier {
            return Err(CodifierError::AmbiguousTree {
                expected: tree.law.identifier.clone(),
                found: self.identifier.clone(),
            });
        }

        let mut articles = self
            .current()
            .map(|v| v.articles.clone())
            .unwrap_or_default();

        match tree.what.target {
            TargetKind::Paragraph => self.apply_paragraph(&mut articles, tree)?,
            TargetKind::Article => self.apply_article(&mut articles, tree)?,
            TargetKind::Clause => self.apply_clause(&mut articles, tree)?,
            TargetKind::Phrase => self.apply_phrase(&mut articles, tree)?,
        }

        let version_index = self
            .versions
            .last()
            .map_or(0, |v| v.version_index + 1);
        self.versions.push(LawVersion {
            version_index,
            articles,
            amendee: amendee.map(String::from),
        });
        Ok(version_index)
    }

    fn apply_paragraph(&self, articles: &mut Articles, tree: &ActionTree) -> Result<()> {
        let node = self.article_node(tree)?;
        let number = node
            .paragraph
            .as_ref()
            .map(|p| p.number)
            .ok_or_else(|| self.incomplete("paragraph number missing"))?;

        let Some(article) = articles.get_mut(&node.number) else {
            return Err(self.target_not_found(Some(&node.number), None));
        };

        match tree.action {
            ActionKind::Insert => {
                article.insert(number, split_units(self.required_content(tree)?));
            }
            ActionKind::Delete => {
                if article.remove(&number).is_none() {
                    return Err(self.target_not_found(Some(&node.number), Some(number)));
                }
            }
            ActionKind::Replace => {
                let units = article
                    .get_mut(&number)
                    .ok_or_else(|| self.target_not_found(Some(&node.number), Some(number)))?;
                *units = split_units(self.required_content(tree)?);
            }
            ActionKind::Amend => {
                let units = article
                    .get_mut(&number)
                    .ok_or_else(|| self.target_not_found(Some(&node.number), Some(number)))?;
                match &tree.what.phrase {
                    Some(edit) => {
                        if !substitute_in_units(units, edit, tree.action) {
                            return Err(
                                self.target_not_found(Some(&node.number), Some(number))
                            );
                        }
                    }
                    None => units.push(self.required_content(tree)?.to_string()),
                }
            }
        }
        Ok(())
    }

    fn apply_article(&self, articles: &mut Articles, tree: &ActionTree) -> Result<()> {
        let node = self.article_node(tree)?;

        match tree.action {
            ActionKind::Insert => {
                articles.insert(
                    node.number.clone(),
                    split_paragraphs(self.required_content(tree)?),
                );
            }
            ActionKind::Delete => {
                if articles.remove(&node.number).is_none() {
                    return Err(self.target_not_found(Some(&node.number), None));
                }
            }
            ActionKind::Replace => {
                let slot = articles
                    .get_mut(&node.number)
                    .ok_or_else(|| self.target_not_found(Some(&node.number), None))?;
                *slot = split_paragraphs(self.required_content(tree)?);
            }
            ActionKind::Amend => {
                let slot = articles
                    .get_mut(&node.number)
                    .ok_or_else(|| self.target_not_found(Some(&node.number), None))?;
                match &tree.what.phrase {
                    Some(edit) => {
                        let hit = slot
                            .values_mut()
                            .any(|units| substitute_in_units(units, edit, tree.action));
                        if !hit {
                            return Err(self.target_not_found(Some(&node.number), None));
                        }
                    }
                    None => {
                        let content = self.required_content(tree)?.to_string();
                        slot.entry(1).or_default().push(content);
                    }
                }
            }
        }
        Ok(())
    }

    /// Clause edits address the lowest-numbered paragraph of the
    /// resolved article; the target numeral, when present, addresses
    /// the n-th text unit (1-based).
    fn apply_clause(&self, articles: &mut Articles, tree: &ActionTree) -> Result<()> {
        let node = self.article_node(tree)?;
        let article_number = node.number.clone();
        let Some(article) = articles.get_mut(&article_number) else {
            return Err(self.target_not_found(Some(&article_number), None));
        };
        let Some((_, units)) = article.iter_mut().next() else {
            return Err(self.target_not_found(Some(&article_number), None));
        };

        let index = tree
            .what
            .number
            .as_deref()
            .and_then(|n| n.parse::<usize>().ok());

        match tree.action {
            ActionKind::Insert => {
                let content = self.required_content(tree)?.to_string();
                let position = index.map_or(units.len(), |n| n.saturating_sub(1).min(units.len()));
                units.insert(position, content);
            }
            ActionKind::Delete => {
                let n = index.ok_or_else(|| self.incomplete("clause numeral missing"))?;
                if n == 0 || n > units.len() {
                    return Err(self.target_not_found(Some(&article_number), None));
                }
                units.remove(n - 1);
            }
            ActionKind::Replace => {
                let content = self.required_content(tree)?.to_string();
                let n = index.ok_or_else(|| self.incomplete("clause numeral missing"))?;
                let unit = units
                    .get_mut(n.wrapping_sub(1))
                    .ok_or_else(|| self.target_not_found(Some(&article_number), None))?;
                *unit = content;
            }
            ActionKind::Amend => match &tree.what.phrase {
                Some(edit) => {
                    if !substitute_in_units(units, edit, tree.action) {
                        return Err(self.target_not_found(Some(&article_number), None));
                    }
                }
                None => {
                    let content = self.required_content(tree)?.to_string();
                    units.push(content);
                }
            },
        }
        Ok(())
    }

    /// Phrase edits carry no article/paragraph address: the target is
    /// the first text unit (article-number order) containing the anchor
    /// phrase.
    fn apply_phrase(&self, articles: &mut Articles, tree: &ActionTree) -> Result<()> {
        let edit = tree
            .what
            .phrase
            .as_ref()
            .ok_or_else(|| self.incomplete("phrase fields missing"))?;

        for paragraphs in articles.values_mut() {
            for units in paragraphs.values_mut() {
                if substitute_in_units(units, edit, tree.action) {
                    return Ok(());
                }
            }
        }
        Err(self.target_not_found(None, None))
    }

    fn article_node<'t>(
        &self,
        tree: &'t ActionTree,
    ) -> Result<&'t nomothesia_parser::generator::ArticleNode> {
        tree.law
            .article
            .as_ref()
            .ok_or_else(|| self.incomplete("article node missing"))
    }

    fn required_content<'t>(&self, tree: &'t ActionTree) -> Result<&'t str> {
        tree.what.content.as_deref().ok_or_else(|| {
            self.incomplete("content required but the extract sequence was exhausted")
        })
    }

    fn incomplete(&self, reason: &str) -> CodifierError {
        CodifierError::IncompleteTree {
            law: self.identifier.clone(),
            reason: reason.to_string(),
        }
    }

    fn target_not_found(&self, article: Option<&str>, paragraph: Option<u32>) -> CodifierError {
        CodifierError::TargetNotFound {
            law: self.identifier.clone(),
            article: article.map(String::from),
            paragraph,
        }
    }
}

/// Apply a phrase edit to the first unit containing the anchor phrase.
///
/// Returns whether a unit matched.
fn substitute_in_units(units: &mut [String], edit: &PhraseEdit, action: ActionKind) -> bool {
    for unit in units.iter_mut() {
        if unit.contains(&edit.old_phrase) {
            *unit = edit_unit(unit, edit, action);
            return true;
        }
    }
    false
}

fn edit_unit(unit: &str, edit: &PhraseEdit, action: ActionKind) -> String {
    match action {
        ActionKind::Replace | ActionKind::Amend => {
            unit.replacen(&edit.old_phrase, &edit.new_phrase, 1)
        }
        ActionKind::Insert => match edit.location {
            PhraseLocation::After => unit.replacen(
                &edit.old_phrase,
                &format!("{} {}", edit.old_phrase, edit.new_phrase),
                1,
            ),
            PhraseLocation::Before => unit.replacen(
                &edit.old_phrase,
                &format!("{} {}", edit.new_phrase, edit.old_phrase),
                1,
            ),
            PhraseLocation::End => format!("{} {}", unit, edit.new_phrase),
        },
        ActionKind::Delete => unit.replacen(&edit.old_phrase, "", 1),
    }
}

/// Split a raw article body into numbered paragraphs.
///
/// Leading text before the first marker becomes paragraph 0; a body
/// without markers becomes a single paragraph 1.
#[must_use]
pub fn split_paragraphs(body: &str) -> Paragraphs {
    let mut result = Paragraphs::new();
    let markers: Vec<(usize, usize, u32)> = PARAGRAPH_MARKER
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str().parse().ok()?;
            Some((whole.start(), whole.end(), number))
        })
        .collect();

    if markers.is_empty() {
        let trimmed = body.trim();
        if !trimmed.is_empty() {
            result.insert(1, split_units(trimmed));
        }
        return result;
    }

    let lead = body[..markers[0].0].trim();
    if !lead.is_empty() {
        result.insert(0, split_units(lead));
    }
    for (i, (_, text_start, number)) in markers.iter().enumerate() {
        let text_end = markers.get(i + 1).map_or(body.len(), |m| m.0);
        let text = body[*text_start..text_end].trim();
        if !text.is_empty() {
            result.insert(*number, split_units(text));
        }
    }
    result
}

/// Split paragraph text into sentence units on ". " boundaries.
#[must_use]
pub fn split_units(text: &str) -> Vec<String> {
    text.split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
