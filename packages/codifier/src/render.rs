//! Rendering of version histories.
//!
//! Exposes the flattened `(version, article, paragraph, text)` walk the
//! presentation layer consumes, plus a plain markdown export. Richer
//! markups stay outside the core.

use crate::law::{Articles, Law};

/// One addressed text unit in the flattened walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatUnit {
    pub version: u32,
    pub article: String,
    pub paragraph: u32,
    pub text: String,
}

/// Article keys in numeric order, alphanumeric keys last.
fn sorted_article_keys(articles: &Articles) -> Vec<&str> {
    let mut keys: Vec<&str> = articles.keys().map(String::as_str).collect();
    keys.sort_by_key(|k| match k.parse::<u32>() {
        Ok(n) => (0, n, *k),
        Err(_) => (1, 0, *k),
    });
    keys
}

/// Flattened ordered walk over a law's full history.
#[must_use]
pub fn flatten(law: &Law) -> Vec<FlatUnit> {
    let mut units = Vec::new();
    for version in law.history() {
        for article in sorted_article_keys(&version.articles) {
            let Some(paragraphs) = version.articles.get(article) else {
                continue;
            };
            for (paragraph, texts) in paragraphs {
                units.push(FlatUnit {
                    version: version.version_index,
                    article: article.to_string(),
                    paragraph: *paragraph,
                    text: texts.join(". "),
                });
            }
        }
    }
    units
}

/// Markdown export of a law's full history.
#[must_use]
pub fn to_markdown(law: &Law) -> String {
    let mut out = format!("# {}\n", law.identifier);
    for version in law.history() {
        out.push_str(&format!("## Έκδοση {}\n", version.version_index));
        for article in sorted_article_keys(&version.articles) {
            let Some(paragraphs) = version.articles.get(article) else {
                continue;
            };
            out.push_str(&format!("### Άρθρο {article}\n"));
            for (paragraph, texts) in paragraphs {
                out.push_str(&format!(" {}. {}\n", paragraph, texts.join(". ")));
            }
        }
    }
    out
}
