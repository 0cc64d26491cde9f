//! Action-tree generation.
//!
//! Consumes one non-extract span plus the owning article's extract
//! cursor and produces typed amendment descriptors: an action verb, a
//! target node, and an explicit law → article → paragraph identifier
//! chain resolved only as deep as the target requires.

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::segmenter::ExtractCursor;
use crate::text;
use crate::vocab::{ActionKind, TargetKind, Vocabulary};

/// Position of a phrase edit relative to its anchor phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseLocation {
    Before,
    After,
    End,
}

/// A positional phrase edit: replace or anchor on `old_phrase`,
/// introduce `new_phrase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseEdit {
    pub location: PhraseLocation,
    pub old_phrase: String,
    pub new_phrase: String,
}

/// Deepest level of the identifier chain: a numbered paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphNode {
    pub number: u32,
}

/// Article level of the identifier chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleNode {
    pub number: String,
    pub paragraph: Option<ParagraphNode>,
}

/// Root of the identifier chain: the statute being amended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawNode {
    pub identifier: String,
    pub article: Option<ArticleNode>,
}

/// The target ("what") node of an action tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatNode {
    /// Token-stream position of the target keyword.
    pub index: usize,

    /// Hierarchy level the keyword names.
    pub target: TargetKind,

    /// Numeral following the keyword, when the next token carries a digit.
    pub number: Option<String>,

    /// Replacement/insertion text pulled from the extract sequence.
    pub content: Option<String>,

    /// Phrase fields, populated only when both anchor and new phrase
    /// were found.
    pub phrase: Option<PhraseEdit>,
}

/// One parsed amendment instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTree {
    /// Effect of the recognized verb.
    pub action: ActionKind,

    /// The verb token as matched.
    pub verb: String,

    /// Token-stream position of the verb.
    pub root_index: usize,

    pub what: WhatNode,

    pub law: LawNode,
}

impl ActionTree {
    /// Nesting depth of the identifier chain.
    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.what.target.max_depth()
    }
}

/// Generate all action trees from one non-extract span.
///
/// Candidates open at every action-verb token, left to right. A
/// candidate is dropped silently when no target keyword falls inside
/// the forward window or when no statute identifier resolves; both
/// cases are debug-logged with the offending span's article for
/// reproduction. The extract cursor advances once per content-bearing
/// candidate, in document order.
#[must_use]
pub fn generate(
    span: &str,
    article: &str,
    cursor: &mut ExtractCursor<'_>,
    vocab: &Vocabulary,
    config: &GeneratorConfig,
) -> Vec<ActionTree> {
    let tokens = text::tokenize(span);
    let mut trees = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Some(action) = vocab.action_of(token) else {
            continue;
        };
        tracing::debug!(article = %article, verb = %token, index = i, "action verb found");

        // Forward window: first (distance, keyword) hit wins. The
        // reverse window in the config is intentionally not searched;
        // see DESIGN.md.
        let mut what_hit = None;
        for distance in 1..=config.max_what_window {
            let j = i + distance;
            let Some(candidate) = tokens.get(j) else {
                break;
            };
            if let Some(target) = vocab.target_of(candidate) {
                what_hit = Some((j, target));
                break;
            }
        }
        let Some((what_index, target)) = what_hit else {
            tracing::debug!(
                article = %article,
                verb = %token,
                window = config.max_what_window,
                "no target keyword in window; candidate dropped"
            );
            continue;
        };

        let number = tokens
            .get(what_index + 1)
            .filter(|t| text::has_digit(t))
            .map(|t| (*t).to_string());

        let mut content = None;
        let mut phrase = None;
        match target {
            TargetKind::Paragraph | TargetKind::Article => {
                if action.requires_content() {
                    content = cursor.next_content().map(str::to_string);
                    if content.is_none() {
                        tracing::warn!(
                            article = %article,
                            verb = %token,
                            "extract sequence exhausted; tree emitted without content"
                        );
                    }
                }
            }
            TargetKind::Clause => {
                content = cursor.next_content().map(str::to_string);
                if content.is_none() {
                    tracing::warn!(
                        article = %article,
                        verb = %token,
                        "extract sequence exhausted; clause tree emitted without content"
                    );
                }
            }
            TargetKind::Phrase => {
                phrase = parse_phrase_edit(span);
            }
        }

        let Some(identifier) = vocab.first_statute(span) else {
            tracing::debug!(
                article = %article,
                verb = %token,
                "no statute identifier resolved; candidate dropped"
            );
            continue;
        };

        let depth = target.max_depth();
        let mut article_node = None;
        if depth >= 2 {
            let Some(article_number) = vocab.find_article_number(span) else {
                tracing::debug!(
                    article = %article,
                    statute = %identifier,
                    "no article reference at required depth; candidate dropped"
                );
                continue;
            };
            let paragraph = if depth > 3 {
                match vocab.find_paragraph_number(span) {
                    Some(number) => Some(ParagraphNode { number }),
                    None => {
                        tracing::debug!(
                            article = %article,
                            statute = %identifier,
                            "no paragraph reference at required depth; candidate dropped"
                        );
                        continue;
                    }
                }
            } else {
                None
            };
            article_node = Some(ArticleNode {
                number: article_number,
                paragraph,
            });
        }

        trees.push(ActionTree {
            action,
            verb: (*token).to_string(),
            root_index: i,
            what: WhatNode {
                index: what_index,
                target,
                number,
                content,
                phrase,
            },
            law: LawNode {
                identifier,
                article: article_node,
            },
        });
    }

    trees
}

/// Capture the phrase fields from the raw (untokenized) span text.
///
/// The anchor phrase follows a connector — "μετά τη φράση «…»" (insert
/// after) or "πριν τη φράση «…»" (insert before) — and the replacement
/// follows " η φράση «…»". Both must be present.
fn parse_phrase_edit(span: &str) -> Option<PhraseEdit> {
    let mut location = PhraseLocation::End;
    let mut old_phrase = None;

    if let Some(p) = quoted_after(span, " μετά τη φράση «") {
        location = PhraseLocation::After;
        old_phrase = Some(p);
    } else if let Some(p) = quoted_after(span, " πριν τη φράση «") {
        location = PhraseLocation::Before;
        old_phrase = Some(p);
    }

    let new_phrase = quoted_after(span, " η φράση «");

    match (old_phrase, new_phrase) {
        (Some(old), Some(new)) => Some(PhraseEdit {
            location,
            old_phrase: old.to_string(),
            new_phrase: new.to_string(),
        }),
        _ => None,
    }
}

/// The text between a marker (which ends at an opening glyph) and the
/// next closing glyph.
fn quoted_after<'a>(span: &'a str, marker: &str) -> Option<&'a str> {
    let at = span.find(marker)?;
    let rest = &span[at + marker.len()..];
    let end = rest.find('»')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::quote_spans;
    use pretty_assertions::assert_eq;

    fn extract_body(contents: &[&str]) -> String {
        contents
            .iter()
            .map(|c| format!("«{c}{}»", " συμπλήρωμα".repeat(12)))
            .collect::<Vec<_>>()
            .join(" και ")
    }

    fn with_cursor<R>(body: &str, f: impl FnOnce(&mut ExtractCursor<'_>) -> R) -> R {
        let spans = quote_spans("test", body, 100).unwrap();
        let mut cursor = ExtractCursor::over(body, &spans);
        f(&mut cursor)
    }

    #[test]
    fn test_add_paragraph_tree() {
        let vocab = Vocabulary::greek();
        let body = extract_body(&["νέο κείμενο"]);
        let span = "Στο άρθρο 5 του ν. 1920/1991 προστίθεται παράγραφος 4";

        let trees = with_cursor(&body, |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });

        assert_eq!(trees.len(), 1);
        let tree = &trees[0];
        assert_eq!(tree.action, ActionKind::Insert);
        assert_eq!(tree.verb, "προστίθεται");
        assert_eq!(tree.max_depth(), 4);
        assert_eq!(tree.what.number, Some("4".to_string()));
        assert!(tree.what.content.as_deref().unwrap().starts_with("νέο κείμενο"));
        assert_eq!(tree.law.identifier, "ν. 1920/1991");
        let article = tree.law.article.as_ref().unwrap();
        assert_eq!(article.number, "5");
        assert_eq!(article.paragraph.as_ref().unwrap().number, 4);
    }

    #[test]
    fn test_delete_needs_no_content() {
        let vocab = Vocabulary::greek();
        let body = String::new();
        let span = "Η παράγραφος 2 του άρθρου 3 του ν. 100/2000 διαγράφεται παράγραφος 2";

        let trees = with_cursor(&body, |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].action, ActionKind::Delete);
        assert_eq!(trees[0].what.content, None);
        assert_eq!(
            trees[0].law.article.as_ref().unwrap().number,
            "3"
        );
    }

    #[test]
    fn test_no_keyword_in_window_drops_candidate() {
        let vocab = Vocabulary::greek();
        let span = "προστίθεται κάτι άσχετο στον ν. 100/2000";

        let trees = with_cursor("", |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });
        assert!(trees.is_empty());
    }

    #[test]
    fn test_missing_statute_drops_candidate() {
        let vocab = Vocabulary::greek();
        let span = "προστίθεται παράγραφος 4 χωρίς παραπομπή";

        let trees = with_cursor("", |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });
        assert!(trees.is_empty());
    }

    #[test]
    fn test_article_target_depth_three() {
        let vocab = Vocabulary::greek();
        let body = extract_body(&["κείμενο άρθρου"]);
        let span = "Το άρθρο 7 του ν. 50/1999 αντικαθίσταται άρθρο 7 ως εξής";

        let trees = with_cursor(&body, |cursor| {
            generate(span, "Άρθρο 2", cursor, &vocab, &GeneratorConfig::default())
        });

        assert_eq!(trees.len(), 1);
        let tree = &trees[0];
        assert_eq!(tree.action, ActionKind::Replace);
        assert_eq!(tree.max_depth(), 3);
        let article = tree.law.article.as_ref().unwrap();
        assert_eq!(article.number, "7");
        assert!(article.paragraph.is_none());
    }

    #[test]
    fn test_phrase_edit_after_connector() {
        let vocab = Vocabulary::greek();
        let span = "Στο ν. 100/2000 προστίθεται φράση μετά τη φράση «παλαιό κείμενο» η φράση «νέο κείμενο»";

        let trees = with_cursor("", |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });

        assert_eq!(trees.len(), 1);
        let tree = &trees[0];
        assert_eq!(tree.max_depth(), 1);
        assert!(tree.law.article.is_none());
        let phrase = tree.what.phrase.as_ref().unwrap();
        assert_eq!(phrase.location, PhraseLocation::After);
        assert_eq!(phrase.old_phrase, "παλαιό κείμενο");
        assert_eq!(phrase.new_phrase, "νέο κείμενο");
    }

    #[test]
    fn test_phrase_edit_requires_both_phrases() {
        let vocab = Vocabulary::greek();
        // Anchor connector present, replacement marker absent.
        let span = "Στο ν. 100/2000 τροποποιείται η φράση μετά τη φράση «παλαιό κείμενο»";

        let trees = with_cursor("", |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });

        assert_eq!(trees.len(), 1);
        assert!(trees[0].what.phrase.is_none());
    }

    #[test]
    fn test_two_candidates_consume_extracts_in_order() {
        let vocab = Vocabulary::greek();
        let body = extract_body(&["πρώτο", "δεύτερο"]);
        let span = "Στο άρθρο 1 του ν. 10/1990 προστίθεται παράγραφος 2 και \
                    προστίθεται παράγραφος 3 στο ίδιο άρθρο";

        let trees = with_cursor(&body, |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });

        assert_eq!(trees.len(), 2);
        assert!(trees[0].what.content.as_deref().unwrap().starts_with("πρώτο"));
        assert!(trees[1].what.content.as_deref().unwrap().starts_with("δεύτερο"));
    }

    #[test]
    fn test_numeral_requires_digit() {
        let vocab = Vocabulary::greek();
        let body = extract_body(&["κείμενο"]);
        let span = "Στο άρθρο 5 του ν. 1920/1991 προστίθεται παράγραφος 4";

        let trees = with_cursor(&body, |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });
        assert_eq!(trees[0].what.number.as_deref(), Some("4"));

        let span_no_digit = "Στο άρθρο 2 του ν. 1920/1991 διαγράφεται παράγραφος τελευταία παρ. 1";
        let trees = with_cursor("", |cursor| {
            generate(
                span_no_digit,
                "Άρθρο 1",
                cursor,
                &vocab,
                &GeneratorConfig::default(),
            )
        });
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].what.number, None);
    }

    #[test]
    fn test_tree_serde_roundtrip() {
        let vocab = Vocabulary::greek();
        let body = extract_body(&["κείμενο"]);
        let span = "Στο άρθρο 5 του ν. 1920/1991 προστίθεται παράγραφος 4";

        let trees = with_cursor(&body, |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });
        let json = serde_json::to_string(&trees[0]).expect("serialize");
        let back: ActionTree = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, trees[0]);
    }

    #[test]
    fn test_exhausted_cursor_emits_tree_without_content() {
        let vocab = Vocabulary::greek();
        let span = "Στο άρθρο 5 του ν. 1920/1991 προστίθεται παράγραφος 4";

        let trees = with_cursor("", |cursor| {
            generate(span, "Άρθρο 1", cursor, &vocab, &GeneratorConfig::default())
        });

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].what.content, None);
    }
}
