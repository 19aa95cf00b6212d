//! Named ingestion contexts
//!
//! ```yaml
//! base: [PATO, UBERON, CL, DOID]
//! contexts:
//!   hubmap: [AZ, HRAVS, HRA]
//!   data_distillery: [GENCODE, REFSEQ, HGNC]
//! ```
//!
//! A context expands to the base list followed by its own list. The name
//! `base` expands to the base list alone.

use crate::config::{parse_yaml, read_text, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Reserved context name for the base list.
pub const BASE_CONTEXT: &str = "base";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    #[serde(default)]
    pub base: Vec<String>,
    #[serde(default)]
    pub contexts: BTreeMap<String, Vec<String>>,
}

impl ContextConfig {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        Self::from_yaml_str(&read_text(path)?, &path.display().to_string())
    }

    pub fn from_yaml_str(text: &str, origin: &str) -> ConfigResult<Self> {
        parse_yaml(text, origin)
    }

    pub fn with_base<I, S>(mut self, sabs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base = sabs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context<I, S>(mut self, name: &str, sabs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contexts
            .insert(name.to_string(), sabs.into_iter().map(Into::into).collect());
        self
    }

    fn profile(&self, name: &str) -> Option<&[String]> {
        self.contexts
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// True if `name` (case-insensitive) is `base` or a configured context.
    pub fn is_context(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(BASE_CONTEXT) || self.profile(name).is_some()
    }

    /// SABs of a context, uppercased; empty for an unknown name.
    pub fn expand(&self, name: &str) -> Vec<String> {
        let base = self.base.iter();
        let sabs: Vec<&String> = if name.eq_ignore_ascii_case(BASE_CONTEXT) {
            base.collect()
        } else {
            match self.profile(name) {
                Some(profile) => base.chain(profile.iter()).collect(),
                None => Vec::new(),
            }
        };
        sabs.into_iter().map(|s| s.trim().to_uppercase()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ContextConfig {
        ContextConfig::from_yaml_str("base: [PATO, uberon]\ncontexts:\n  HuBMAP: [AZ, HRAVS]\n", "t").unwrap()
    }

    #[test]
    fn base_expands_alone() {
        assert_eq!(config().expand("base"), vec!["PATO", "UBERON"]);
        assert_eq!(config().expand("BASE"), vec!["PATO", "UBERON"]);
    }

    #[test]
    fn profile_follows_base() {
        assert_eq!(config().expand("hubmap"), vec!["PATO", "UBERON", "AZ", "HRAVS"]);
        assert!(config().is_context("HUBMAP"));
    }

    #[test]
    fn unknown_context_is_empty() {
        assert!(config().expand("FOO").is_empty());
        assert!(!config().is_context("FOO"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ContextConfig::from_yaml_str("bases: [A]\n", "t").is_err());
    }
}
