//! Corpus store contract and reference backends.
//!
//! The codifier reads and writes laws and links through this narrow
//! interface only, so any storage engine can be substituted without
//! touching parsing or apply logic. Two backends ship with the crate:
//! an in-memory map for tests and small runs, and a file-per-record
//! JSON directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::law::Law;
use crate::links::Link;

/// Narrow read/write contract over the statute corpus.
pub trait CorpusStore {
    /// Look up a law by canonical identifier.
    fn find_law(&self, identifier: &str) -> Result<Option<Law>>;

    /// Persist a law record, replacing any previous state.
    fn save_law(&mut self, law: &Law) -> Result<()>;

    /// Look up a link record by mentioned identifier.
    fn find_link(&self, identifier: &str) -> Result<Option<Link>>;

    /// Persist a link record, replacing any previous state.
    fn save_link(&mut self, link: &Link) -> Result<()>;

    /// Identifiers of every stored law.
    fn law_identifiers(&self) -> Result<Vec<String>>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    laws: BTreeMap<String, Law>,
    links: BTreeMap<String, Link>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CorpusStore for MemoryStore {
    fn find_law(&self, identifier: &str) -> Result<Option<Law>> {
        Ok(self.laws.get(identifier).cloned())
    }

    fn save_law(&mut self, law: &Law) -> Result<()> {
        self.laws.insert(law.identifier.clone(), law.clone());
        Ok(())
    }

    fn find_link(&self, identifier: &str) -> Result<Option<Link>> {
        Ok(self.links.get(identifier).cloned())
    }

    fn save_link(&mut self, link: &Link) -> Result<()> {
        self.links.insert(link.identifier.clone(), link.clone());
        Ok(())
    }

    fn law_identifiers(&self) -> Result<Vec<String>> {
        Ok(self.laws.keys().cloned().collect())
    }
}

/// File-per-record JSON directory store.
///
/// Laws live under `laws/`, links under `links/`, one JSON file each,
/// named by a filesystem-safe form of the identifier.
#[derive(Debug)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open (and create, if needed) a store rooted at `root`.
    ///
    /// # Errors
    /// IO errors creating the directory layout.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("laws"))?;
        fs::create_dir_all(root.join("links"))?;
        Ok(Self { root })
    }

    fn record_path(&self, kind: &str, identifier: &str) -> PathBuf {
        self.root.join(kind).join(format!("{}.json", slug(identifier)))
    }

    fn read_record<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn write_record<T: serde::Serialize>(path: &Path, record: &T) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(record)?)?;
        Ok(())
    }
}

impl CorpusStore for JsonDirStore {
    fn find_law(&self, identifier: &str) -> Result<Option<Law>> {
        Self::read_record(&self.record_path("laws", identifier))
    }

    fn save_law(&mut self, law: &Law) -> Result<()> {
        Self::write_record(&self.record_path("laws", &law.identifier), law)
    }

    fn find_link(&self, identifier: &str) -> Result<Option<Link>> {
        Self::read_record(&self.record_path("links", identifier))
    }

    fn save_link(&mut self, link: &Link) -> Result<()> {
        Self::write_record(&self.record_path("links", &link.identifier), link)
    }

    fn law_identifiers(&self) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();
        for entry in fs::read_dir(self.root.join("laws"))? {
            let entry = entry?;
            if let Some(law) = Self::read_record::<Law>(&entry.path())? {
                identifiers.push(law.identifier);
            }
        }
        identifiers.sort();
        Ok(identifiers)
    }
}

/// Filesystem-safe form of an identifier.
fn slug(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else {
                '_'
            }
        })
        .collect()
}
