//! Identifier and vocabulary tables.
//!
//! The closed vocabularies of the amendment language: action verbs,
//! target nouns, and the regex families for statute, decree,
//! legislative-act, article and paragraph identifiers. The tables are
//! immutable once built and injected explicitly into the segmenter and
//! the generator — there is no process-wide mutable registry.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dates::DATE_PATTERN;
use crate::text;

/// Effect of a recognized amendment verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// προστίθεται — insert a new unit.
    Insert,

    /// διαγράφεται — remove the addressed unit.
    Delete,

    /// αντικαθίσταται — substitute the addressed unit wholesale.
    Replace,

    /// τροποποιείται — amend in place, usually via a phrase edit.
    Amend,
}

impl ActionKind {
    /// Whether this verb needs replacement/insertion content from the
    /// article's extract sequence.
    #[must_use]
    pub fn requires_content(&self) -> bool {
        !matches!(self, Self::Delete)
    }
}

/// Hierarchy level named by a target keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// παράγραφος — numbered paragraph inside an article.
    Paragraph,

    /// άρθρο — whole article.
    Article,

    /// εδάφιο / περίπτωση — text unit inside a paragraph.
    Clause,

    /// φράση — positional phrase edit, not numeral-addressed.
    Phrase,
}

impl TargetKind {
    /// Nesting depth the identifier chain is resolved to.
    ///
    /// Paragraph targets address law → article → paragraph; article
    /// targets stop one level higher; clause targets address the
    /// article without a paragraph numeral; phrase targets address the
    /// law only and carry their position in the phrase fields.
    #[must_use]
    pub fn max_depth(&self) -> u8 {
        match self {
            Self::Paragraph => 4,
            Self::Article => 3,
            Self::Clause => 2,
            Self::Phrase => 1,
        }
    }
}

/// Immutable vocabulary and identifier tables, built once at startup.
#[derive(Debug)]
pub struct Vocabulary {
    actions: Vec<(String, ActionKind)>,
    targets: Vec<(String, TargetKind)>,
    statutes: Regex,
    decrees: Regex,
    legislative_acts: Vec<Regex>,
    article_refs: Vec<Regex>,
    paragraph_refs: Vec<Regex>,
    new_statute: Regex,
}

#[allow(clippy::expect_used)] // Static patterns that are guaranteed to be valid
impl Vocabulary {
    /// The Greek gazette vocabulary.
    #[must_use]
    pub fn greek() -> Self {
        let actions = [
            ("προστίθεται", ActionKind::Insert),
            ("προστίθενται", ActionKind::Insert),
            ("διαγράφεται", ActionKind::Delete),
            ("διαγράφονται", ActionKind::Delete),
            ("αντικαθίσταται", ActionKind::Replace),
            ("αντικαθίστανται", ActionKind::Replace),
            ("τροποποιείται", ActionKind::Amend),
            ("τροποποιούνται", ActionKind::Amend),
        ];
        let targets = [
            ("παράγραφος", TargetKind::Paragraph),
            ("παράγραφοι", TargetKind::Paragraph),
            ("άρθρο", TargetKind::Article),
            ("εδάφιο", TargetKind::Clause),
            ("περίπτωση", TargetKind::Clause),
            ("φράση", TargetKind::Phrase),
        ];

        let legislative_act = format!("{DATE_PATTERN}\\s+Πράξης?\\s+Νομοθετικού\\s+Περιεχομένου");

        Self {
            actions: actions
                .iter()
                .map(|(w, k)| ((*w).to_string(), *k))
                .collect(),
            targets: targets
                .iter()
                .map(|(w, k)| ((*w).to_string(), *k))
                .collect(),
            statutes: Regex::new(r"ν\.\s?\d{1,4}/\d{4}").expect("valid regex"),
            decrees: Regex::new(r"π\.\s?δ\.\s?\d{1,4}/\d{4}").expect("valid regex"),
            legislative_acts: vec![Regex::new(&legislative_act).expect("valid regex")],
            article_refs: vec![
                Regex::new(r"άρθρο \d+\w*").expect("valid regex"),
                Regex::new(r"άρθρου \d+\w*").expect("valid regex"),
                Regex::new(r"Άρθρο \d+\w*").expect("valid regex"),
            ],
            paragraph_refs: vec![
                Regex::new(r"παράγραφος \d+").expect("valid regex"),
                Regex::new(r"παραγράφου \d+").expect("valid regex"),
                Regex::new(r"παρ\. \d+").expect("valid regex"),
            ],
            new_statute: Regex::new(r"ΝΟΜΟΣ ΥΠ[’'΄]\s?ΑΡΙΘΜ?\.?\s*(\d+)").expect("valid regex"),
        }
    }

    /// Look up a stripped token in the action-verb table.
    #[must_use]
    pub fn action_of(&self, token: &str) -> Option<ActionKind> {
        self.actions
            .iter()
            .find(|(w, _)| w == token)
            .map(|(_, k)| *k)
    }

    /// Look up a stripped token in the target-keyword table.
    #[must_use]
    pub fn target_of(&self, token: &str) -> Option<TargetKind> {
        self.targets
            .iter()
            .find(|(w, _)| w == token)
            .map(|(_, k)| *k)
    }

    /// All statute mentions in `text`, in priority order: law citations
    /// first (document order), then presidential decrees, then
    /// legislative acts.
    #[must_use]
    pub fn find_statutes(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .statutes
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        found.extend(self.decrees.find_iter(text).map(|m| m.as_str().to_string()));
        for pattern in &self.legislative_acts {
            found.extend(pattern.find_iter(text).map(|m| m.as_str().to_string()));
        }
        found
    }

    /// The highest-priority statute mention, if any.
    #[must_use]
    pub fn first_statute(&self, text: &str) -> Option<String> {
        self.find_statutes(text).into_iter().next()
    }

    /// Article number of the first article reference in `text`.
    ///
    /// The reference patterns all place the number as the second
    /// whitespace-delimited token ("άρθρο 5" → "5").
    #[must_use]
    pub fn find_article_number(&self, text: &str) -> Option<String> {
        for pattern in &self.article_refs {
            if let Some(m) = pattern.find(text) {
                return m.as_str().split_whitespace().nth(1).map(String::from);
            }
        }
        None
    }

    /// Paragraph number of the first paragraph reference in `text`.
    #[must_use]
    pub fn find_paragraph_number(&self, text: &str) -> Option<u32> {
        for pattern in &self.paragraph_refs {
            if let Some(m) = pattern.find(text) {
                return m
                    .as_str()
                    .split_whitespace()
                    .nth(1)
                    .and_then(|n| n.parse().ok());
            }
        }
        None
    }

    /// Whether any token of `text` is a recognized action verb.
    #[must_use]
    pub fn contains_action(&self, text: &str) -> bool {
        text::tokenize(text)
            .iter()
            .any(|t| self.action_of(t).is_some())
    }

    /// Statute number announced by a new-law heading, if the line is one.
    #[must_use]
    pub fn new_statute_number(&self, line: &str) -> Option<String> {
        self.new_statute
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::greek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_lookup() {
        let vocab = Vocabulary::greek();
        assert_eq!(vocab.action_of("προστίθεται"), Some(ActionKind::Insert));
        assert_eq!(vocab.action_of("διαγράφεται"), Some(ActionKind::Delete));
        assert_eq!(vocab.action_of("αντικαθίσταται"), Some(ActionKind::Replace));
        assert_eq!(vocab.action_of("τροποποιείται"), Some(ActionKind::Amend));
        assert_eq!(vocab.action_of("λέξη"), None);
    }

    #[test]
    fn test_target_lookup_and_depth() {
        let vocab = Vocabulary::greek();
        assert_eq!(vocab.target_of("παράγραφος"), Some(TargetKind::Paragraph));
        assert_eq!(TargetKind::Paragraph.max_depth(), 4);
        assert_eq!(TargetKind::Article.max_depth(), 3);
        assert_eq!(TargetKind::Clause.max_depth(), 2);
        assert_eq!(TargetKind::Phrase.max_depth(), 1);
    }

    #[test]
    fn test_find_statutes_priority_order() {
        let vocab = Vocabulary::greek();
        let text = "κατά το π.δ. 34/2001 και το ν. 1920/1991";
        let found = vocab.find_statutes(text);
        // Law citations outrank decrees regardless of document order.
        assert_eq!(found[0], "ν. 1920/1991");
        assert_eq!(found[1], "π.δ. 34/2001");
    }

    #[test]
    fn test_find_legislative_act() {
        let vocab = Vocabulary::greek();
        let text = "κυρώνεται η από 12.12.2012 Πράξη Νομοθετικού Περιεχομένου";
        let found = vocab.find_statutes(text);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("12.12.2012"));
    }

    #[test]
    fn test_find_article_number() {
        let vocab = Vocabulary::greek();
        assert_eq!(
            vocab.find_article_number("Στο άρθρο 5 του ν. 1920/1991"),
            Some("5".to_string())
        );
        assert_eq!(vocab.find_article_number("χωρίς αναφορά"), None);
    }

    #[test]
    fn test_find_paragraph_number() {
        let vocab = Vocabulary::greek();
        assert_eq!(
            vocab.find_paragraph_number("προστίθεται παράγραφος 4"),
            Some(4)
        );
        assert_eq!(vocab.find_paragraph_number("καμία"), None);
    }

    #[test]
    fn test_contains_action_strips_punctuation() {
        let vocab = Vocabulary::greek();
        assert!(vocab.contains_action("το άρθρο τροποποιείται, ως εξής"));
        assert!(!vocab.contains_action("απλή αναφορά στο άρθρο"));
    }

    #[test]
    fn test_new_statute_number() {
        let vocab = Vocabulary::greek();
        assert_eq!(
            vocab.new_statute_number("ΝΟΜΟΣ ΥΠ’ ΑΡΙΘΜ. 4009"),
            Some("4009".to_string())
        );
        assert_eq!(vocab.new_statute_number("Άρθρο 1"), None);
    }
}
