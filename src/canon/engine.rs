//! The canonicalization engine
//!
//! `raw → default pass → ordered rule overlay → finalization`. The engine is
//! pure: the rule set and prefix table are owned by the [`Canonicalizer`] and
//! never change after construction. It never fails; degraded results carry
//! their [`Fidelity`].

use super::prefix::PrefixTable;
use super::rules::{RuleContext, RuleSet};
use super::template::default_pass;
use super::CodeId;
use serde::Serialize;
use tracing::debug;

/// Namespace used when coercion has no SAB to fall back on.
pub const UNKNOWN_SAB: &str = "UNKNOWN";

/// How much of a canonical value is grounded in the raw identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    /// The raw identifier was empty
    Empty,
    /// A special-case rule fired
    Exact,
    /// Only the default pass applied
    Default,
    /// The namespace was taken from the ingesting SAB
    Coerced,
}

impl Fidelity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Exact => "exact",
            Self::Default => "default",
            Self::Coerced => "coerced",
        }
    }
}

impl std::fmt::Display for Fidelity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine output for one raw identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Canonical {
    pub value: String,
    pub fidelity: Fidelity,
    /// Name of the winning rule, if any fired
    pub rule: Option<String>,
}

impl Canonical {
    fn empty() -> Self {
        Self {
            value: String::new(),
            fidelity: Fidelity::Empty,
            rule: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The value as a validated identifier. `None` only for empty input.
    pub fn code_id(&self) -> Option<CodeId> {
        CodeId::parse(&self.value).ok()
    }
}

impl std::fmt::Display for Canonical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Maps raw identifiers into the `NAMESPACE:CODE` scheme.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    rules: RuleSet,
    prefixes: PrefixTable,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(RuleSet::builtin(), PrefixTable::empty())
    }
}

impl Canonicalizer {
    pub fn new(rules: RuleSet, prefixes: PrefixTable) -> Self {
        Self { rules, prefixes }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Canonicalize one raw identifier seen while ingesting `source_sab`.
    pub fn canonicalize(&self, raw: &str, source_sab: &str) -> Canonical {
        let raw = raw.trim();
        if raw.is_empty() {
            return Canonical::empty();
        }

        let ctx = RuleContext {
            source_sab,
            prefixes: &self.prefixes,
        };
        let (candidate, fidelity, rule) = match self.rules.overlay(raw, &ctx) {
            Some((candidate, rule)) => (candidate, Fidelity::Exact, Some(rule.to_string())),
            None => (default_pass(raw), Fidelity::Default, None),
        };

        match finalize(&candidate) {
            Some(value) => Canonical { value, fidelity, rule },
            None => {
                let value = coerce(&candidate, raw, source_sab);
                debug!(raw, value = %value, sab = source_sab, "coerced identifier");
                Canonical {
                    value,
                    fidelity: Fidelity::Coerced,
                    rule,
                }
            }
        }
    }

    /// Canonicalize a batch of identifiers, preserving order.
    pub fn canonicalize_all<'a, I>(&self, raws: I, source_sab: &str) -> Vec<Canonical>
    where
        I: IntoIterator<Item = &'a str>,
    {
        raws.into_iter()
            .map(|raw| self.canonicalize(raw, source_sab))
            .collect()
    }
}

/// Split a candidate into namespace and code.
///
/// A colon ahead of any whitespace is the delimiter; otherwise the first
/// whitespace run is.
fn split_candidate(candidate: &str) -> Option<(&str, &str)> {
    let colon = candidate.find(':');
    let space = candidate.find(char::is_whitespace);
    match (colon, space) {
        (Some(c), Some(s)) if c < s => Some((&candidate[..c], &candidate[c + 1..])),
        (Some(c), None) => Some((&candidate[..c], &candidate[c + 1..])),
        (_, Some(s)) => Some((&candidate[..s], &candidate[s..])),
        (None, None) => None,
    }
}

fn is_bare_cui(s: &str) -> bool {
    s.len() > 1 && s.starts_with('C') && s[1..].bytes().all(|b| b.is_ascii_digit())
}

/// `NAMESPACE:CODE` when the candidate has both halves, or is a bare CUI.
/// Anything [`CodeId::parse`] would reject is left to coercion.
fn finalize(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    let value = match split_candidate(candidate) {
        Some((namespace, code)) => format!("{}:{}", namespace.to_uppercase(), code.trim_start()),
        None if is_bare_cui(candidate) => format!("UMLS:{}", candidate),
        None => return None,
    };
    CodeId::parse(&value).is_ok().then_some(value)
}

/// Upper-case namespace with delimiters, whitespace and characters that have
/// no upper-case form replaced by `_`.
fn clean_namespace(namespace: &str) -> String {
    namespace
        .trim()
        .to_uppercase()
        .chars()
        .map(|c| if c == ':' || c.is_whitespace() || c.is_lowercase() { '_' } else { c })
        .collect()
}

/// Give a bare or half-empty candidate the ingesting SAB as its namespace.
fn coerce(candidate: &str, raw: &str, source_sab: &str) -> String {
    let candidate = candidate.trim();
    let code = match split_candidate(candidate) {
        Some((namespace, code)) => match code.trim_start() {
            "" => namespace,
            code => code,
        },
        None => candidate,
    };
    let code = if code.is_empty() {
        let flattened: String = raw
            .chars()
            .map(|c| match c {
                ':' | '/' | '#' => '_',
                c if c.is_whitespace() => '_',
                c => c,
            })
            .collect();
        match flattened.trim_matches('_') {
            "" => "_".to_string(),
            s => s.to_string(),
        }
    } else {
        code.to_string()
    };

    let sab = match clean_namespace(source_sab) {
        sab if sab.is_empty() => UNKNOWN_SAB.to_string(),
        sab => sab,
    };
    format!("{}:{}", sab, code)
}
