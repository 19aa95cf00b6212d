//! Ordered, pattern-conditioned canonicalization rules
//!
//! Every rule is evaluated against the original raw identifier. When a rule
//! matches, its rewrite replaces whatever candidate earlier rules produced:
//! the last matching rule wins. Nothing is composed.
//!
//! The built-in order mirrors the historical special cases (SAB aliases
//! first, IRI-shape special cases after, underscore-preserving namespaces
//! last) and ends with the canonical fixed point, which keeps already
//! canonical strings unchanged.

use super::prefix::PrefixTable;
use super::template::{Template, TemplateContext, TemplateError};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Name of the terminal rule that makes canonicalization idempotent.
pub const FIXED_POINT_RULE: &str = "canonical-fixed-point";

/// True for strings already of the form `[A-Z0-9_.]+:.+`.
pub fn is_canonical_shape(raw: &str) -> bool {
    match raw.split_once(':') {
        Some((namespace, code)) => {
            !namespace.is_empty()
                && namespace
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '.')
                && !code.is_empty()
                && !code.contains('\n')
        }
        None => false,
    }
}

/// Errors building a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule '{0}': invalid template: {1}")]
    Template(String, #[source] TemplateError),

    #[error("rule '{0}': invalid regex: {1}")]
    Regex(String, #[source] regex_lite::Error),

    #[error("rule '{0}': exactly one of `contains` or `regex` is required")]
    Matcher(String),
}

/// What a rule looks for in the raw identifier.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Literal substring
    Contains(String),
    /// Regular expression; capture groups feed `{1}`..`{9}`
    Regex(Regex),
    /// Legacy `NS NS:CODE` form; captures namespace and code
    LegacyDoublePrefix,
    /// Longest IRI prefix from the loaded prefix table; captures SAB and remainder
    PrefixTable,
    /// Already canonical `NAMESPACE:CODE`
    CanonicalShape,
}

/// Inputs a rule may consult beyond the raw identifier.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub source_sab: &'a str,
    pub prefixes: &'a PrefixTable,
}

/// A guarded rewrite of raw identifiers.
#[derive(Debug, Clone)]
pub struct CanonicalizationRule {
    name: String,
    matcher: Matcher,
    rewrite: Template,
    /// Only fire while ingesting one of these SABs
    scope: Option<Vec<String>>,
}

impl CanonicalizationRule {
    pub fn new(name: impl Into<String>, matcher: Matcher, rewrite: &str) -> Result<Self, RuleError> {
        let name = name.into();
        let rewrite = Template::parse(rewrite).map_err(|e| RuleError::Template(name.clone(), e))?;
        Ok(Self {
            name,
            matcher,
            rewrite,
            scope: None,
        })
    }

    pub fn contains(name: impl Into<String>, needle: &str, rewrite: &str) -> Result<Self, RuleError> {
        Self::new(name, Matcher::Contains(needle.to_string()), rewrite)
    }

    pub fn regex(name: impl Into<String>, pattern: &str, rewrite: &str) -> Result<Self, RuleError> {
        let name = name.into();
        let re = Regex::new(pattern).map_err(|e| RuleError::Regex(name.clone(), e))?;
        Self::new(name, Matcher::Regex(re), rewrite)
    }

    /// Restrict the rule to the given source SABs.
    pub fn scoped<S: AsRef<str>>(mut self, sabs: &[S]) -> Self {
        if !sabs.is_empty() {
            self.scope = Some(sabs.iter().map(|s| s.as_ref().to_uppercase()).collect());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Option<&[String]> {
        self.scope.as_deref()
    }

    fn in_scope(&self, source_sab: &str) -> bool {
        match &self.scope {
            None => true,
            Some(sabs) => sabs.iter().any(|s| s.eq_ignore_ascii_case(source_sab)),
        }
    }

    /// Captures when the rule matches `raw`, `None` otherwise.
    fn captures(&self, raw: &str, ctx: &RuleContext) -> Option<Vec<String>> {
        match &self.matcher {
            Matcher::Contains(needle) => raw.contains(needle.as_str()).then(Vec::new),
            Matcher::Regex(re) => re.captures(raw).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            }),
            Matcher::LegacyDoublePrefix => {
                let (first, rest) = raw.split_once(char::is_whitespace)?;
                let (namespace, code) = rest.trim_start().split_once(':')?;
                (first.eq_ignore_ascii_case(namespace) && !code.is_empty())
                    .then(|| vec![first.to_string(), code.to_string()])
            }
            Matcher::PrefixTable => ctx
                .prefixes
                .lookup(raw)
                .filter(|m| !m.remainder.is_empty())
                .map(|m| vec![m.sab.to_string(), m.remainder.to_string()]),
            Matcher::CanonicalShape => is_canonical_shape(raw).then(Vec::new),
        }
    }

    /// The rewritten candidate if the rule fires for `raw`.
    pub fn apply(&self, raw: &str, ctx: &RuleContext) -> Option<String> {
        if !self.in_scope(ctx.source_sab) {
            return None;
        }
        let captures = self.captures(raw, ctx)?;
        Some(self.rewrite.render(&TemplateContext::new(raw, &captures)))
    }
}

/// A configured rule, as written in the pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub name: String,
    #[serde(default)]
    pub contains: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
    pub template: String,
    #[serde(default)]
    pub sab: Vec<String>,
}

impl RuleSpec {
    pub fn build(&self) -> Result<CanonicalizationRule, RuleError> {
        let rule = match (&self.contains, &self.regex) {
            (Some(needle), None) => CanonicalizationRule::contains(&self.name, needle, &self.template)?,
            (None, Some(pattern)) => CanonicalizationRule::regex(&self.name, pattern, &self.template)?,
            _ => return Err(RuleError::Matcher(self.name.clone())),
        };
        Ok(rule.scoped(&self.sab))
    }
}

// ---------------------------------------------------------------------------
// Built-in rules
// ---------------------------------------------------------------------------

enum Builtin {
    Contains(&'static str),
    Regex(&'static str),
    DoublePrefix,
    Prefixes,
}

struct BuiltinRule {
    name: &'static str,
    matcher: Builtin,
    rewrite: &'static str,
    scope: &'static [&'static str],
}

const BUILTIN_RULES: &[BuiltinRule] = &[
    // SAB aliases
    BuiltinRule { name: "ncit-alias", matcher: Builtin::Regex(r"(?:^|[/#])NCIT[_:]([^/#\s]+)$"), rewrite: "NCI {1}", scope: &[] },
    BuiltinRule { name: "mesh-alias", matcher: Builtin::Regex(r"(?:^|[/#])MESH[_:]([^/#\s]+)$"), rewrite: "MSH {1}", scope: &[] },
    BuiltinRule { name: "ncbitaxon-alias", matcher: Builtin::Regex(r"(?:^|[/#])NCBITaxon[_:]([^/#\s]+)$"), rewrite: "NCBI {1}", scope: &[] },
    BuiltinRule { name: "hp-alias", matcher: Builtin::Regex(r"(?:^|[/#])HP[_:]([0-9]+)$"), rewrite: "HPO {1}", scope: &[] },
    BuiltinRule { name: "fma-alias", matcher: Builtin::Regex(r"(?i)(?:^|[/#])fma[_:]?([0-9]+)$"), rewrite: "FMA {1}", scope: &[] },
    BuiltinRule { name: "umls-alias", matcher: Builtin::Contains("UMLS"), rewrite: "UMLS {token}", scope: &[] },
    BuiltinRule { name: "snomed-alias", matcher: Builtin::Contains("SNOMED"), rewrite: "SNOMEDCT_US {token}", scope: &[] },
    BuiltinRule { name: "prefix-table", matcher: Builtin::Prefixes, rewrite: "{1} {2}", scope: &[] },
    // HGNC shapes
    BuiltinRule { name: "hugo-hgnc", matcher: Builtin::Regex(r"Hugo\.owl#HGNC_([0-9]+)$"), rewrite: "HGNC {1}", scope: &[] },
    BuiltinRule { name: "hgnc-report", matcher: Builtin::Regex(r"(?i)hgnc_id=(?:HGNC:)?([0-9]+)"), rewrite: "HGNC {1}", scope: &[] },
    BuiltinRule { name: "legacy-double-prefix", matcher: Builtin::DoublePrefix, rewrite: "{1} {2}", scope: &[] },
    BuiltinRule { name: "mondo-hgnc", matcher: Builtin::Contains("http://identifiers.org/hgnc"), rewrite: "HGNC {segment}", scope: &["MONDO"] },
    // Domain-qualified codes; the underscore belongs to the code
    BuiltinRule { name: "edam-xref", matcher: Builtin::Regex(r"(?i)^edam:([a-z]+_[0-9]+)$"), rewrite: "EDAM {1}", scope: &[] },
    BuiltinRule { name: "edam-iri", matcher: Builtin::Contains("edamontology.org"), rewrite: "EDAM {local}", scope: &[] },
    BuiltinRule { name: "glyco-glycan", matcher: Builtin::Contains("http://purl.jp/bio/12/glyco/glycan"), rewrite: "GLYCO.GLYCAN {local}", scope: &[] },
    BuiltinRule { name: "glyco-conjugate", matcher: Builtin::Contains("http://purl.jp/bio/12/glyco/conjugate"), rewrite: "GLYCO.CONJUGATE {local}", scope: &[] },
    // NCBI Gene ids live in the NCI namespace with a C prefix
    BuiltinRule { name: "ncbi-gene", matcher: Builtin::Regex(r"ncbi\.nlm\.nih\.gov/gene/([0-9]+)$"), rewrite: "NCI C{1}", scope: &[] },
    BuiltinRule { name: "nifstd", matcher: Builtin::Contains("http://uri.neuinfo.org/nif/nifstd"), rewrite: "NIFSTD {local}", scope: &[] },
    BuiltinRule { name: "uniprot", matcher: Builtin::Contains("http://purl.uniprot.org"), rewrite: "UNIPROT {segment}", scope: &[] },
    BuiltinRule { name: "uniprotkb", matcher: Builtin::Contains("http://purl.uniprot.org/uniprot/"), rewrite: "UNIPROTKB {segment}", scope: &["UNIPROTKB"] },
    BuiltinRule { name: "hravs", matcher: Builtin::Contains("http://purl.humanatlas.io/valueset/"), rewrite: "HRAVS {segment}", scope: &[] },
    BuiltinRule { name: "ncit-thesaurus", matcher: Builtin::Contains("Thesaurus.owl"), rewrite: "NCI {fragment}", scope: &[] },
    // Separator-bearing codes the default pass would destroy
    BuiltinRule {
        name: "refseq",
        matcher: Builtin::Regex(r"(?:^REFSEQ[ :]|ncbi\.nlm\.nih\.gov/nuccore/)([A-Z]{2}_[0-9]+(?:\.[0-9]+)?)$"),
        rewrite: "REFSEQ {1}",
        scope: &[],
    },
    BuiltinRule { name: "reactome", matcher: Builtin::Regex(r"(?:^|[/: ])(R-[A-Z]{3}-[0-9]+)$"), rewrite: "REACTOME {1}", scope: &[] },
];

fn build_builtin(spec: &BuiltinRule) -> Result<CanonicalizationRule, RuleError> {
    let rule = match spec.matcher {
        Builtin::Contains(needle) => CanonicalizationRule::contains(spec.name, needle, spec.rewrite)?,
        Builtin::Regex(pattern) => CanonicalizationRule::regex(spec.name, pattern, spec.rewrite)?,
        Builtin::DoublePrefix => CanonicalizationRule::new(spec.name, Matcher::LegacyDoublePrefix, spec.rewrite)?,
        Builtin::Prefixes => CanonicalizationRule::new(spec.name, Matcher::PrefixTable, spec.rewrite)?,
    };
    Ok(rule.scoped(spec.scope))
}

/// A totally ordered rule list, always terminated by the canonical fixed point.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CanonicalizationRule>,
    fixed_point: CanonicalizationRule,
}

impl RuleSet {
    /// Only the fixed point: every identifier takes the default pass.
    pub fn empty() -> Self {
        let fixed_point = CanonicalizationRule {
            name: FIXED_POINT_RULE.to_string(),
            matcher: Matcher::CanonicalShape,
            rewrite: Template::identity(),
            scope: None,
        };
        Self {
            rules: Vec::new(),
            fixed_point,
        }
    }

    /// The built-in special cases, in precedence order.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        for spec in BUILTIN_RULES {
            match build_builtin(spec) {
                Ok(rule) => set.push(rule),
                Err(e) => error!(error = %e, "skipping invalid built-in rule"),
            }
        }
        set
    }

    /// Append a rule; it takes precedence over every rule already present
    /// except the fixed point.
    pub fn push(&mut self, rule: CanonicalizationRule) {
        self.rules.push(rule);
    }

    /// Append configured rules in their declared order.
    pub fn extend_from_specs(&mut self, specs: &[RuleSpec]) -> Result<(), RuleError> {
        for spec in specs {
            self.push(spec.build()?);
        }
        Ok(())
    }

    /// Rules in evaluation order, fixed point last.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalizationRule> {
        self.rules.iter().chain(std::iter::once(&self.fixed_point))
    }

    pub fn len(&self) -> usize {
        self.rules.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Evaluate every rule against `raw`; the last match wins.
    ///
    /// Returns the winning candidate and the name of the rule that produced it.
    pub fn overlay<'s>(&'s self, raw: &str, ctx: &RuleContext) -> Option<(String, &'s str)> {
        self.iter()
            .filter_map(|rule| rule.apply(raw, ctx).map(|c| (c, rule.name())))
            .last()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}
