//! IRI prefix → SAB side table
//!
//! Loaded once per process from a tab-delimited resource:
//!
//! ```text
//! # prefix<TAB>SAB
//! http://purl.obolibrary.org/obo/CL_	CL
//! http://www.orpha.net/ORDO/Orphanet_	ORDO
//! ```
//!
//! A missing resource is not an error: the table is simply empty and the
//! rules that consult it never fire.

use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PrefixEntry {
    prefix: String,
    sab: String,
}

/// Literal IRI-prefix substrings mapped to a source abbreviation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    /// Sorted longest prefix first so lookups prefer the most specific entry
    entries: Vec<PrefixEntry>,
}

/// A prefix match: the SAB and whatever followed the prefix in the raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch<'a> {
    pub sab: &'a str,
    pub remainder: &'a str,
}

impl PrefixTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(prefix, sab)` pairs.
    pub fn from_pairs<I, P, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (prefix, sab) in pairs {
            table.insert(prefix, sab);
        }
        table
    }

    pub fn insert(&mut self, prefix: impl Into<String>, sab: impl Into<String>) {
        let entry = PrefixEntry {
            prefix: prefix.into(),
            sab: sab.into().to_uppercase(),
        };
        self.entries.retain(|e| e.prefix != entry.prefix);
        self.entries.push(entry);
        self.entries
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()).then_with(|| a.prefix.cmp(&b.prefix)));
    }

    /// Parse the tab-delimited text form. Malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            match line.split_once('\t') {
                Some((prefix, sab)) if !prefix.trim().is_empty() && !sab.trim().is_empty() => {
                    table.insert(prefix.trim(), sab.trim());
                }
                _ => warn!(line = idx + 1, "skipping malformed prefix table line"),
            }
        }
        table
    }

    /// Load from a file. Absence or unreadability degrades to an empty table.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let table = Self::parse(&text);
                debug!(path = %path.display(), entries = table.len(), "loaded prefix table");
                table
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "prefix table unavailable; prefix rules will not fire"
                );
                Self::empty()
            }
        }
    }

    /// Find the longest prefix contained in `raw`.
    pub fn lookup<'a>(&'a self, raw: &'a str) -> Option<PrefixMatch<'a>> {
        self.entries.iter().find_map(|e| {
            raw.find(&e.prefix).map(|pos| PrefixMatch {
                sab: &e.sab,
                remainder: &raw[pos + e.prefix.len()..],
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
