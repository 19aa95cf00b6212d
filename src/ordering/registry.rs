//! The source registry
//!
//! A map of upper-case source tokens to entries saying how the source is
//! built. Read from JSON (the legacy `ontologies.json`) or YAML, chosen by
//! file extension:
//!
//! ```json
//! {
//!   "PATO": { "owl_url": "http://purl.obolibrary.org/obo/pato.owl", "home_url": "..." },
//!   "GENCODE": { "execute": "./gencode/gencode.sh", "depends_on": ["HGNC"] },
//!   "HRAVS": { "edges_nodes_dir": "./ubkg_edges_nodes/HRAVS" }
//! }
//! ```

use crate::config::{parse_json, parse_yaml, read_text, CommandSpec, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryEntry {
    /// SAB written to the graph, when it differs from the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owl_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Local file name for the downloaded OWL, when the URL's last segment
    /// is not usable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_owl_url_to_file_name: Option<String>,
    /// Custom converter producing the SAB's OWLNETS files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<CommandSpec>,
    /// Directory of pre-built edges/nodes files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges_nodes_dir: Option<PathBuf>,
    /// Sources whose nodes this source's edges reference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// How a registry entry is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind<'a> {
    Execute(&'a CommandSpec),
    EdgesNodes(&'a Path),
    Owl(&'a str),
    /// Nothing to run; OWLNETS files are expected to exist already
    Prebuilt,
}

impl RegistryEntry {
    pub fn owl(url: impl Into<String>) -> Self {
        Self {
            owl_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    /// File name the OWL download is saved under: the explicit override, or
    /// the last path segment of `owl_url`.
    pub fn owl_file_name(&self) -> Option<&str> {
        let explicit = self.download_owl_url_to_file_name.as_deref().map(str::trim);
        if let Some(name) = explicit.filter(|n| !n.is_empty()) {
            return Some(name);
        }
        self.owl_url
            .as_deref()
            .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
    }

    /// `execute` wins over `edges_nodes_dir`, which wins over `owl_url`.
    pub fn kind(&self) -> SourceKind<'_> {
        if let Some(cmd) = &self.execute {
            SourceKind::Execute(cmd)
        } else if let Some(dir) = &self.edges_nodes_dir {
            SourceKind::EdgesNodes(dir)
        } else if let Some(url) = &self.owl_url {
            SourceKind::Owl(url)
        } else {
            SourceKind::Prebuilt
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl SourceRegistry {
    /// Validate keys: every source token must be upper case.
    pub fn from_entries(entries: BTreeMap<String, RegistryEntry>) -> ConfigResult<Self> {
        if let Some(key) = entries.keys().find(|k| k.chars().any(char::is_lowercase)) {
            return Err(ConfigError::LowercaseKey(key.clone()));
        }
        Ok(Self { entries })
    }

    pub fn from_json_str(text: &str, origin: &str) -> ConfigResult<Self> {
        Self::from_entries(parse_json(text, origin)?)
    }

    pub fn from_yaml_str(text: &str, origin: &str) -> ConfigResult<Self> {
        Self::from_entries(parse_yaml(text, origin)?)
    }

    /// Load by extension: `.json` is JSON, anything else YAML. Relative
    /// `edges_nodes_dir` paths resolve against the registry's directory.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let origin = path.display().to_string();
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let mut registry = if is_json {
            Self::from_json_str(&text, &origin)?
        } else {
            Self::from_yaml_str(&text, &origin)?
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for entry in registry.entries.values_mut() {
            if let Some(dir) = entry.edges_nodes_dir.as_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        debug!(path = %origin, sources = registry.len(), "loaded source registry");
        Ok(registry)
    }

    /// Add an entry, for building registries in code.
    pub fn with_entry(mut self, key: &str, entry: RegistryEntry) -> Self {
        self.entries.insert(key.to_uppercase(), entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The SAB written to the graph for a registry key.
    pub fn sab_for(&self, key: &str) -> String {
        self.get(key)
            .and_then(|e| e.sab.as_deref())
            .unwrap_or(key)
            .to_uppercase()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
